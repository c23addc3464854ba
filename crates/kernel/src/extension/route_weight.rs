/// Weight of the matched route inside its weight group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteWeight {
    pub group: String,
    pub weight: u32,
}

impl RouteWeight {
    pub fn new(group: impl Into<String>, weight: u32) -> Self {
        Self { group: group.into(), weight }
    }
}
