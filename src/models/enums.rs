use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(CertificationType {
    AsPermitted => "as_permitted",
    AsBuilt => "as_built",
});

impl CertificationType {
    /// Human-readable title used on the document itself.
    pub fn title(&self) -> &'static str {
        match self {
            Self::AsPermitted => "As-Permitted",
            Self::AsBuilt => "As-Built",
        }
    }

    /// Field-change notes only feed into as-built certificates.
    pub fn includes_field_changes(&self) -> bool {
        matches!(self, Self::AsBuilt)
    }
}

str_enum!(ReviewStatus {
    Generating => "generating",
    PendingReview => "pending_review",
    Approved => "approved",
    Rejected => "rejected",
});

str_enum!(TaskStatus {
    Open => "open",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});
