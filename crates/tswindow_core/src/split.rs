//! Partition roles for train/validation/test data.

use serde::{Deserialize, Serialize};

/// The role a partition plays in a training run.
///
/// Partitions are disjoint and derived from one source series. Scalers are fit
/// on [`Split::Train`] only and applied unchanged to the other two.
///
/// # Example
///
/// ```rust
/// use tswindow_core::Split;
///
/// assert_eq!(Split::Valid.partition_name("ett"), "ett_valid");
/// assert_eq!(Split::Test.to_string(), "test");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training partition, the only one scalers are fit on.
    Train,
    /// Validation partition.
    Valid,
    /// Test partition.
    Test,
}

impl Split {
    /// Lowercase suffix used in partition names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test => "test",
        }
    }

    /// Name of this partition for a data set called `data_name`, e.g. `"ett_train"`.
    #[must_use]
    pub fn partition_name(&self, data_name: &str) -> String {
        format!("{}_{}", data_name, self.as_str())
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_name() {
        assert_eq!(Split::Train.partition_name("ett"), "ett_train");
        assert_eq!(Split::Valid.partition_name("ett"), "ett_valid");
        assert_eq!(Split::Test.partition_name("ett"), "ett_test");
    }

    #[test]
    fn test_split_serialization() {
        let json = serde_json::to_string(&Split::Valid).unwrap();
        assert_eq!(json, "\"valid\"");
        let restored: Split = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Split::Valid);
    }
}
