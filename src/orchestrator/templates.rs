use crate::controller::types::TemplateInfo;
use crate::controller::ControllerClient;

use super::OrchestrateError;

/// Scan the catalog for an exact, case-sensitive `(name, type)` match.
/// The controller does not promise catalog uniqueness; when duplicates
/// exist the first-listed entry wins, and callers rely on that.
pub fn find_template<'a>(
    catalog: &'a [TemplateInfo],
    name: &str,
    kind: &str,
) -> Option<&'a TemplateInfo> {
    catalog
        .iter()
        .find(|t| t.name == name && t.template_type == kind)
}

/// Resolve a template's opaque id by `(name, type)` from the controller
/// catalog. One GET per call.
pub async fn resolve_template(
    client: &ControllerClient,
    name: &str,
    kind: &str,
) -> Result<String, OrchestrateError> {
    let catalog = client.templates().await?;
    match find_template(&catalog, name, kind) {
        Some(t) => {
            tracing::info!(template = name, kind, "Resolved template id {}", t.template_id);
            Ok(t.template_id.clone())
        }
        None => Err(OrchestrateError::TemplateNotFound {
            name: name.to_string(),
            kind: kind.to_string(),
        }),
    }
}
