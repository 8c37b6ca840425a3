//! User administration (admin only)

use std::sync::Arc;

use cemac_client::UserApi;
use shared::models::{User, UserUpdate};

use crate::error::{PosError, PosResult};
use crate::session::{SessionGuard, guard};
use crate::validation::{MAX_NAME_LEN, validate_optional_text};

/// Roles the auth API knows about
pub const ROLES: [&str; 2] = ["admin", "vendedor"];

pub fn validate_user_update(update: &UserUpdate) -> PosResult<()> {
    if let Some(name) = &update.name
        && name.trim().is_empty()
    {
        return Err(PosError::validation("El nombre no puede estar vacío"));
    }
    validate_optional_text(&update.name, "Nombre", MAX_NAME_LEN)?;
    if let Some(role) = &update.role
        && !ROLES.contains(&role.as_str())
    {
        return Err(PosError::validation(format!("Rol desconocido: {role}")));
    }
    Ok(())
}

pub struct UserService {
    api: Arc<dyn UserApi>,
    session: Arc<dyn SessionGuard>,
}

impl UserService {
    pub fn new(api: Arc<dyn UserApi>, session: Arc<dyn SessionGuard>) -> Self {
        Self { api, session }
    }

    fn require_admin(&self) -> PosResult<User> {
        let user = self.session.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(PosError::AdminRequired)
        }
    }

    pub async fn list(&self) -> PosResult<Vec<User>> {
        self.require_admin()?;
        guard(self.session.as_ref(), self.api.list_users().await)
    }

    pub async fn update(&self, id: &str, update: UserUpdate) -> PosResult<User> {
        let admin = self.require_admin()?;
        validate_user_update(&update)?;
        // an admin cannot lock themselves out
        if admin.id == id && (update.active == Some(false) || update.role.as_deref() == Some("vendedor")) {
            return Err(PosError::validation("No puedes desactivar ni degradar tu propia cuenta"));
        }
        let user = guard(self.session.as_ref(), self.api.update_user(id, &update).await)?;
        tracing::info!(user_id = %user.id, role = %user.role, active = user.active, "User updated");
        Ok(user)
    }
}
