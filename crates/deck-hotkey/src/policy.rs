use crate::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub emit: bool,
}

/// Classify how the listener should handle a given event.
///
/// - If suspended, nothing is emitted.
/// - If not matched, nothing is emitted.
/// - Only the initial KeyDown of a matched combination is emitted; OS
///   auto-repeat and KeyUp never re-fire a binding.
pub fn classify(suspended: bool, matched: Option<u32>, kind: EventKind, is_repeat: bool) -> Decision {
    if suspended || matched.is_none() {
        return Decision { emit: false };
    }
    Decision {
        emit: matches!(kind, EventKind::KeyDown) && !is_repeat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_ignores_everything() {
        let d = classify(true, Some(1), EventKind::KeyDown, false);
        assert!(!d.emit);
    }

    #[test]
    fn non_match_emits_nothing() {
        let d = classify(false, None, EventKind::KeyDown, false);
        assert!(!d.emit);
    }

    #[test]
    fn repeats_and_key_up_are_not_emitted() {
        assert!(!classify(false, Some(1), EventKind::KeyDown, true).emit);
        assert!(!classify(false, Some(1), EventKind::KeyUp, false).emit);
    }

    #[test]
    fn match_initial_emits() {
        assert!(classify(false, Some(1), EventKind::KeyDown, false).emit);
    }
}
