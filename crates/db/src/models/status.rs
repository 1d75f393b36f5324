//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data (1-based) in the
//! corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Run lifecycle status.
    ///
    /// Transitions are monotonic: Queued -> Running -> {Success, Failed};
    /// Canceled is terminal and reachable from Queued (and, in principle,
    /// Running). No transition moves backward.
    RunStatus {
        Queued = 1,
        Running = 2,
        Success = 3,
        Failed = 4,
        Canceled = 5,
    }
}

impl RunStatus {
    /// Whether this status is terminal (no further transitions occur).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Canceled)
    }

    /// Map a raw database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Queued),
            2 => Some(Self::Running),
            3 => Some(Self::Success),
            4 => Some(Self::Failed),
            5 => Some(Self::Canceled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_data_order() {
        assert_eq!(RunStatus::Queued.id(), 1);
        assert_eq!(RunStatus::Running.id(), 2);
        assert_eq!(RunStatus::Success.id(), 3);
        assert_eq!(RunStatus::Failed.id(), 4);
        assert_eq!(RunStatus::Canceled.id(), 5);
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            RunStatus::Queued,
            RunStatus::Running,
            RunStatus::Success,
            RunStatus::Failed,
            RunStatus::Canceled,
        ] {
            assert_eq!(RunStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(RunStatus::from_id(0), None);
        assert_eq!(RunStatus::from_id(6), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Canceled.is_terminal());
    }
}
