use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

/// The effectors of a full-body biped IK solver that can take part in interactions.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FullBodyEffector {
    Body,
    LeftShoulder,
    RightShoulder,
    LeftThigh,
    RightThigh,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl FullBodyEffector {
    pub const ALL: [FullBodyEffector; 9] = [
        FullBodyEffector::Body,
        FullBodyEffector::LeftShoulder,
        FullBodyEffector::RightShoulder,
        FullBodyEffector::LeftThigh,
        FullBodyEffector::RightThigh,
        FullBodyEffector::LeftHand,
        FullBodyEffector::RightHand,
        FullBodyEffector::LeftFoot,
        FullBodyEffector::RightFoot,
    ];

    /// Hands and feet sit at the end of a limb chain. Only those have their chain parameters
    /// (pull, reach, push...) driven by interactions.
    pub fn is_end_effector(self) -> bool {
        matches!(
            self,
            FullBodyEffector::LeftHand
                | FullBodyEffector::RightHand
                | FullBodyEffector::LeftFoot
                | FullBodyEffector::RightFoot
        )
    }
}
