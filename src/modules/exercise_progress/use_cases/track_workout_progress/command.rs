use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::WorkoutRecord;

/// A workout mutation reported by the workout CRUD layer, carrying the set
/// data as it existed before and after the change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutChange<'a> {
    Created(&'a WorkoutRecord),
    Deleted(&'a WorkoutRecord),
    Updated {
        previous: &'a WorkoutRecord,
        current: &'a WorkoutRecord,
    },
}

impl<'a> WorkoutChange<'a> {
    pub fn workout_id(&self) -> &'a str {
        match self {
            WorkoutChange::Created(workout) | WorkoutChange::Deleted(workout) => &workout.id,
            WorkoutChange::Updated { current, .. } => &current.id,
        }
    }

    pub fn user_id(&self) -> &'a str {
        match self {
            WorkoutChange::Created(workout) | WorkoutChange::Deleted(workout) => &workout.user_id,
            WorkoutChange::Updated { previous, .. } => &previous.user_id,
        }
    }

    /// The workout whose contributions are removed first.
    pub fn withdrawn(&self) -> Option<&'a WorkoutRecord> {
        match self {
            WorkoutChange::Created(_) => None,
            WorkoutChange::Deleted(workout) => Some(workout),
            WorkoutChange::Updated { previous, .. } => Some(previous),
        }
    }

    /// The workout whose contributions are added afterwards.
    pub fn recorded(&self) -> Option<&'a WorkoutRecord> {
        match self {
            WorkoutChange::Created(workout) => Some(workout),
            WorkoutChange::Deleted(_) => None,
            WorkoutChange::Updated { current, .. } => Some(current),
        }
    }

    pub fn scopes(&self) -> Vec<ScopeKey> {
        self.withdrawn()
            .into_iter()
            .chain(self.recorded())
            .map(WorkoutRecord::scope)
            .collect()
    }
}

#[cfg(test)]
mod workout_change_tests {
    use super::*;
    use crate::tests::fixtures::workouts::WorkoutBuilder;
    use rstest::rstest;

    #[rstest]
    fn it_should_withdraw_the_previous_and_record_the_current_workout_on_update() {
        let previous = WorkoutBuilder::new().build();
        let current = WorkoutBuilder::new().category_id("category-2").build();
        let change = WorkoutChange::Updated {
            previous: &previous,
            current: &current,
        };
        assert_eq!(change.withdrawn(), Some(&previous));
        assert_eq!(change.recorded(), Some(&current));
        assert_eq!(
            change.scopes(),
            vec![previous.scope(), ScopeKey::new("user-fixed-0001", "category-2")]
        );
    }

    #[rstest]
    fn it_should_only_record_on_create_and_only_withdraw_on_delete() {
        let workout = WorkoutBuilder::new().build();
        assert_eq!(WorkoutChange::Created(&workout).withdrawn(), None);
        assert_eq!(WorkoutChange::Deleted(&workout).recorded(), None);
        assert_eq!(WorkoutChange::Deleted(&workout).scopes(), vec![workout.scope()]);
    }
}
