use crate::filter::FilterTarget;
use crate::objects::impl_ruleset_object;
use crate::reconcile::raw_scalar_enum;
use civdata_derive::{LenientDeserialize, Reconcile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeliefType {
    Pantheon,
    Founder,
    Follower,
    Enhancer,
    Any,
}

impl BeliefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeliefType::Pantheon => "Pantheon",
            BeliefType::Founder => "Founder",
            BeliefType::Follower => "Follower",
            BeliefType::Enhancer => "Enhancer",
            BeliefType::Any => "Any",
        }
    }
}

raw_scalar_enum!(BeliefType);

#[derive(Debug, Clone, Default, PartialEq, Serialize, LenientDeserialize, Reconcile)]
#[serde(rename_all = "camelCase")]
pub struct Belief {
    pub name: String,

    #[reconcile]
    pub r#type: Option<BeliefType>,

    #[reconcile]
    pub uniques: Vec<String>,

    #[serde(skip_deserializing)]
    pub origin_ruleset: String,
}

impl_ruleset_object!(Belief);

impl FilterTarget for Belief {
    fn keywords(&self) -> Vec<&str> {
        self.r#type.map(|t| t.as_str()).into_iter().collect()
    }
}
