//! Named policy goals, such as a target share of renewable electricity.
use crate::id::define_id_type;
use indexmap::IndexMap;

define_id_type! {GoalID}

/// A named policy goal
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// The goal's key
    pub id: GoalID,
    /// The value requested by the user, if any
    pub user_value: Option<f64>,
}

impl Goal {
    fn new(id: GoalID) -> Self {
        Self {
            id,
            user_value: None,
        }
    }

    /// Whether the user has set a value for this goal
    pub fn is_set(&self) -> bool {
        self.user_value.is_some()
    }
}

/// An identity map of [`Goal`]s, owned by one graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Goals(IndexMap<GoalID, Goal>);

impl Goals {
    /// Create an empty set of goals
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the goal for `key`, creating it if this is the first lookup
    pub fn find_or_create(&mut self, key: &str) -> &mut Goal {
        self.0
            .entry(GoalID::new(key))
            .or_insert_with_key(|id| Goal::new(id.clone()))
    }

    /// Look up the goal for `key` without creating it
    pub fn get(&self, key: &str) -> Option<&Goal> {
        self.0.get(key)
    }

    /// Whether the user has set a value for the goal
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(Goal::is_set)
    }

    /// Iterate over all goals in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.0.values()
    }

    /// The number of goals looked up so far
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no goal has been looked up yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
