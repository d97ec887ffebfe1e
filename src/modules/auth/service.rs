use admitdesk_auth::create_access_token;
use admitdesk_config::JwtConfig;
use admitdesk_core::errors::AppError;
use admitdesk_core::password::verify_password;
use admitdesk_db::AdminRepository;
use admitdesk_models::admins::{LoginRequest, LoginResponse};
use anyhow::anyhow;
use tracing::instrument;

use crate::metrics::{track_admin_login_failure, track_admin_login_success, track_jwt_issued};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(admins, dto, jwt_config), fields(username = %dto.username))]
    pub async fn login(
        admins: &dyn AdminRepository,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let Some(admin) = admins.find_by_username(dto.username.trim()).await? else {
            track_admin_login_failure("unknown_admin");
            return Err(AppError::not_found(anyhow!("Admin not found")));
        };

        if !verify_password(&dto.password, &admin.password_hash)? {
            track_admin_login_failure("invalid_password");
            return Err(AppError::unauthorized("Invalid credentials".to_string()));
        }

        let token = create_access_token(admin.id, &admin.username, jwt_config)?;
        track_jwt_issued();
        track_admin_login_success();

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
        })
    }
}
