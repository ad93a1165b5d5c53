#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub username: String,
    pub email: String,
}
