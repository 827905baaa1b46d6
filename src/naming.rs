//! Name inference for captured files.
//!
//! Every captured item needs a non-empty sort key even when the underlying
//! message has no file name (photos, voice notes). The policy, in strict
//! priority order: explicit file-name attribute, then caption, then a
//! synthesized `{label}_{timestamp}` name. The inferred name is only used
//! for ordering and confirmation text; it is never a real file name.

use crate::events::FileEvent;
use chrono::Utc;

/// The guaranteed non-empty fallback name.
pub const FALLBACK_NAME: &str = "unnamed";

/// Collapse whitespace runs to single spaces and trim the ends.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Infer a sortable name for a file-bearing event.
///
/// Pure function of the event; never returns an empty string.
#[must_use]
pub fn infer_name(event: &FileEvent) -> String {
    if event.kind.carries_file_name() {
        if let Some(name) = event.file_name.as_deref() {
            let name = normalize(name);
            if !name.is_empty() {
                return name;
            }
        }
    }

    // A present caption wins over synthesis, even if normalization leaves
    // nothing usable; that degenerate case resolves to the fallback.
    if let Some(caption) = event.caption.as_deref().filter(|c| !c.is_empty()) {
        let caption = normalize(caption);
        return if caption.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            caption
        };
    }

    let ts = event.timestamp.unwrap_or_else(Utc::now);
    format!("{}_{}", event.kind.label(), ts.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MediaKind, MessageRef};
    use crate::session::SessionKey;
    use chrono::TimeZone;

    fn event(kind: MediaKind) -> FileEvent {
        FileEvent::new(SessionKey::new(1, 2), MessageRef(3), kind)
    }

    #[test]
    fn test_explicit_name_is_normalized() {
        let ev = event(MediaKind::Document).with_file_name("  report   v2 .pdf ");
        assert_eq!(infer_name(&ev), "report v2 .pdf");
    }

    #[test]
    fn test_blank_name_falls_through_to_caption() {
        let ev = event(MediaKind::Video)
            .with_file_name("   ")
            .with_caption("holiday clip");
        assert_eq!(infer_name(&ev), "holiday clip");
    }

    #[test]
    fn test_photo_ignores_file_name_attribute() {
        // Photos never carry a real file name; a stray attribute is ignored.
        let ev = event(MediaKind::Photo)
            .with_file_name("bogus.jpg")
            .with_caption("sunset");
        assert_eq!(infer_name(&ev), "sunset");
    }

    #[test]
    fn test_synthesized_name_uses_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 6).unwrap();
        let ev = event(MediaKind::Photo).with_timestamp(ts);
        assert_eq!(infer_name(&ev), "photo_20240309_140506");

        let ev = event(MediaKind::Voice).with_timestamp(ts);
        assert_eq!(infer_name(&ev), "voice_20240309_140506");

        let ev = event(MediaKind::Document).with_timestamp(ts);
        assert_eq!(infer_name(&ev), "media_20240309_140506");
    }

    #[test]
    fn test_whitespace_caption_resolves_to_fallback() {
        let ev = event(MediaKind::Photo).with_caption("   ");
        assert_eq!(infer_name(&ev), FALLBACK_NAME);
    }

    #[test]
    fn test_never_empty() {
        let kinds = [
            MediaKind::Document,
            MediaKind::Photo,
            MediaKind::Video,
            MediaKind::Audio,
            MediaKind::Voice,
            MediaKind::Animation,
        ];
        for kind in kinds {
            for name in [None, Some(""), Some("  ")] {
                for caption in [None, Some(""), Some("  "), Some("x")] {
                    let mut ev = event(kind);
                    ev.file_name = name.map(str::to_string);
                    ev.caption = caption.map(str::to_string);
                    assert!(!infer_name(&ev).is_empty(), "{kind} {name:?} {caption:?}");
                }
            }
        }
    }
}
