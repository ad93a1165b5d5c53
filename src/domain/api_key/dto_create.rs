/// Validated input for creating an API key. `user_id` is the only
/// permitted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateApiKeyDto {
    pub user_id: i32,
}
