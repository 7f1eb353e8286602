use serde::Serialize;
use uuid::Uuid;

use crate::nutrition::MacroGoals;
use crate::tenant::TenantId;

/// Response body of `GET /me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub experience_id: TenantId,
    pub macro_target: MacroGoals,
}
