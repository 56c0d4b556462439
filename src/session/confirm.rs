/// Destructive actions need a second press on the same target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Cancel,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub target_id: String,
    pub action: PendingAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// First press; waiting for the confirming one.
    Armed,
    Confirmed,
}

#[derive(Debug, Default)]
pub struct ConfirmGuard {
    pending: Option<PendingConfirmation>,
}

impl ConfirmGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, target_id: &str, action: PendingAction) -> Press {
        match &self.pending {
            Some(p) if p.target_id == target_id && p.action == action => {
                self.pending = None;
                Press::Confirmed
            }
            _ => {
                self.pending = Some(PendingConfirmation {
                    target_id: target_id.to_string(),
                    action,
                });
                Press::Armed
            }
        }
    }

    /// Drops any armed action, e.g. on "keep it" or when the view changes.
    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_press_confirms() {
        let mut guard = ConfirmGuard::new();
        assert_eq!(guard.press("a1", PendingAction::Cancel), Press::Armed);
        assert!(guard.pending().is_some());
        assert_eq!(guard.press("a1", PendingAction::Cancel), Press::Confirmed);
        assert!(guard.pending().is_none());
    }

    #[test]
    fn test_other_target_or_action_rearms() {
        let mut guard = ConfirmGuard::new();
        guard.press("a1", PendingAction::Cancel);
        assert_eq!(guard.press("a2", PendingAction::Cancel), Press::Armed);
        assert_eq!(guard.press("a2", PendingAction::Complete), Press::Armed);
        assert_eq!(
            guard.pending(),
            Some(&PendingConfirmation {
                target_id: "a2".to_string(),
                action: PendingAction::Complete,
            })
        );
    }

    #[test]
    fn test_dismiss_clears() {
        let mut guard = ConfirmGuard::new();
        guard.press("a1", PendingAction::Complete);
        guard.dismiss();
        assert_eq!(guard.press("a1", PendingAction::Complete), Press::Armed);
    }
}
