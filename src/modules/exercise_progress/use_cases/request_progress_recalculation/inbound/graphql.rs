use async_graphql::{Context, ID, Object, Result as GqlResult};

use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::shell::state::AppState;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn request_progress_recalculation(
        &self,
        context: &Context<'_>,
        user_id: String,
        category_id: String,
    ) -> GqlResult<ID> {
        let state = context.data_unchecked::<AppState>();
        let job_id = state
            .recalculation_handler
            .handle(ProgressCalculationJob::new(user_id, category_id))
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(ID(job_id))
    }
}
