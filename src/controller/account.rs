//! Login, signup and logout

use super::{AppController, Route};
use crate::auth::{Credentials, SignupRequest};

impl AppController {
    pub async fn login(&self, email: &str, password: &str) {
        match self.session.login(Credentials::new(email, password)).await {
            Ok(identity) => {
                self.model.clear_error().await;
                self.model
                    .set_status(format!("Welcome, {}", identity.display_name()))
                    .await;
                self.router.navigate(Route::Home.path());
                self.load_active_view().await;
            }
            Err(e) => self.report("login", e).await,
        }
    }

    pub async fn signup(&self, email: &str, username: &str, password: &str) {
        let request = SignupRequest::new(email, username, password);
        match self.session.signup(request).await {
            Ok(()) => {
                self.model.clear_error().await;
                self.model
                    .set_status("Signup successful! Log in to continue.".to_string())
                    .await;
                self.router.navigate(Route::Login.path());
            }
            Err(e) => self.report("signup", e).await,
        }
    }

    pub async fn logout(&self) {
        self.session.logout();
        self.model.reset().await;
        self.model.set_status("Logged out".to_string()).await;
    }
}
