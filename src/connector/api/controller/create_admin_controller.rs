use anyhow::Result;

use crate::application::RegistrationInput;

use super::super::Container;

pub struct CreateAdminController<'a> {
    container: &'a Container,
}

impl<'a> CreateAdminController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn create(
        &self,
        username: String,
        email: String,
        password: String,
        profile_type: String,
    ) -> Result<String> {
        let use_case = self.container.register_use_case();
        let session = use_case
            .create_staff(RegistrationInput {
                username: Some(username),
                email: Some(email),
                repeated_password: Some(password.clone()),
                password: Some(password),
                profile_type: Some(profile_type),
            })
            .await?;

        Ok(format!(
            "Created staff user '{}' (id {})\nToken: {}",
            session.username, session.user_id, session.token
        ))
    }
}
