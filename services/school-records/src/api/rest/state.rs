//! 路由共享状态

use std::sync::Arc;

use edu_auth_core::TokenService;

use crate::application::{
    AuthService, GradeService, MarkService, Repositories, SubjectService, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub subjects: SubjectService,
    pub grades: GradeService,
    pub marks: MarkService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        token_service: Arc<TokenService>,
        allow_self_registration: bool,
    ) -> Self {
        let users = UserService::new(repos.clone());
        Self {
            subjects: SubjectService::new(repos.clone()),
            grades: GradeService::new(repos.clone()),
            marks: MarkService::new(repos),
            auth: AuthService::new(users.clone(), token_service, allow_self_registration),
            users,
        }
    }
}
