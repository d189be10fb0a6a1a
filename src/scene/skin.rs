//! Skin data for skeletal meshes
//!
//! A [`Skin`] is pure data: the named bones a skinned mesh binds to and the
//! inverse bind-pose matrix for each. Pose evaluation belongs to the render
//! backend.

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Bind-pose data shared by skinned mesh instances
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skin {
    /// Bone names, in palette order
    pub bone_names: Vec<String>,
    /// Inverse bind-pose matrix per bone
    pub inverse_bind_pose: Vec<Mat4>,
}

impl Skin {
    /// Create a skin from parallel bone/matrix lists.
    ///
    /// # Panics
    ///
    /// Panics if the two lists differ in length.
    #[must_use]
    pub fn new(bone_names: Vec<String>, inverse_bind_pose: Vec<Mat4>) -> Self {
        assert_eq!(
            bone_names.len(),
            inverse_bind_pose.len(),
            "skin bone list and bind pose list must match"
        );
        Self {
            bone_names,
            inverse_bind_pose,
        }
    }

    /// Number of bones in the palette
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_names.len()
    }

    /// Palette index of a named bone
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_lookup() {
        let skin = Skin::new(
            vec!["root".to_string(), "arm".to_string()],
            vec![Mat4::IDENTITY, Mat4::IDENTITY],
        );
        assert_eq!(skin.bone_count(), 2);
        assert_eq!(skin.bone_index("arm"), Some(1));
        assert_eq!(skin.bone_index("leg"), None);
    }

    #[test]
    #[should_panic(expected = "must match")]
    fn test_mismatched_lists_panic() {
        let _ = Skin::new(vec!["root".to_string()], Vec::new());
    }
}
