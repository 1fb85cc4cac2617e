use crossterm::event::{KeyCode, KeyEvent};
use termtable_db::{ConnectionProfile, ConnectionRegistry, RegistryError};
use termtable_ui::{StatusLine, widgets::table::DataTable};
use tracing::{info, warn};

use super::Transition;

/// Lists saved connections and opens one of them
#[derive(Debug, Clone, Default)]
pub struct ConnectionPicker {
    pub table: DataTable<ConnectionProfile>,
    pub status: StatusLine,
    /// Name awaiting a `y` to confirm deletion
    pub pending_delete: Option<String>,
}

impl ConnectionPicker {
    /// Populate from the registry. A failed read shows an empty list and the
    /// error instead of leaving the picker.
    #[must_use]
    pub fn load(registry: &ConnectionRegistry) -> Self {
        let mut picker = Self::default();
        picker.reload(registry);
        picker
    }

    fn reload(&mut self, registry: &ConnectionRegistry) {
        match registry.list() {
            Ok(profiles) => {
                self.table = DataTable::new(profiles);
                if self.table.items.is_empty() {
                    self.status.set_message("No saved connections");
                }
            }
            Err(e) => {
                warn!(error = %e, "could not list connections");
                self.table = DataTable::new(Vec::new());
                self.status.set_error(format!("Could not load connections: {e}"));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, registry: &ConnectionRegistry) -> Transition {
        if let Some(name) = self.pending_delete.take() {
            if let (_, KeyCode::Char('y' | 'Y')) = (key.modifiers, key.code) {
                self.delete(&name, registry);
            } else {
                self.status.set_message("Delete cancelled");
            }
            return Transition::Stay;
        }

        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => Transition::Home,
            (_, KeyCode::Down | KeyCode::Char('j')) => {
                self.table.select_next();
                Transition::Stay
            }
            (_, KeyCode::Up | KeyCode::Char('k')) => {
                self.table.select_previous();
                Transition::Stay
            }
            (_, KeyCode::Char('d')) => {
                if let Some(profile) = self.table.selected_item() {
                    self.status
                        .set_message(format!("Delete '{}'? (y/n)", profile.name));
                    self.pending_delete = Some(profile.name.clone());
                }
                Transition::Stay
            }
            (_, KeyCode::Enter) => self.open_selected(registry),
            _ => Transition::Stay,
        }
    }

    fn open_selected(&mut self, registry: &ConnectionRegistry) -> Transition {
        let Some(selected) = self.table.selected_item() else {
            return Transition::Stay;
        };

        match registry.resolve_credentials(&selected.name) {
            Ok((user, pass)) => Transition::Browse {
                profile: selected.clone().with_credentials(user, pass),
                persist: false,
            },
            Err(e @ (RegistryError::CredentialsMissing(_) | RegistryError::Corrupt(_))) => {
                warn!(name = %selected.name, error = %e, "cannot open connection");
                self.status.set_error(e.to_string());
                Transition::Stay
            }
            Err(e @ (RegistryError::Underlying(_) | RegistryError::InvalidProfile(_))) => {
                warn!(name = %selected.name, error = %e, "secret store failed");
                self.status
                    .set_error(format!("Could not read credentials: {e}"));
                Transition::Stay
            }
        }
    }

    fn delete(&mut self, name: &str, registry: &ConnectionRegistry) {
        match registry.delete(name) {
            Ok(()) => {
                info!(name, "deleted connection");
                self.reload(registry);
                self.status.set_success(format!("Deleted '{name}'"));
            }
            Err(e) => {
                warn!(name, error = %e, "delete failed");
                self.status.set_error(format!("Could not delete '{name}': {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use termtable_auth::{MemorySecretStore, SecretStore};
    use termtable_db::{MetadataStore, registry::SECRET_REALM};

    use super::*;
    use crate::screens::test_support::{key, profile, registry};

    #[test]
    fn test_load_lists_in_name_order() {
        let registry = registry();
        registry.save(&profile("beta")).unwrap();
        registry.save(&profile("alpha")).unwrap();

        let picker = ConnectionPicker::load(&registry);
        let names: Vec<_> = picker.table.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[test]
    fn test_enter_resolves_credentials() {
        let registry = registry();
        registry.save(&profile("local")).unwrap();
        let mut picker = ConnectionPicker::load(&registry);

        let transition = picker.handle_key(key(KeyCode::Enter), &registry);
        let Transition::Browse { profile, persist } = transition else {
            panic!("expected browse, got {transition:?}");
        };
        assert!(!persist);
        assert_eq!(profile.user, "admin");
        assert_eq!(profile.pass, "pw");
    }

    #[test]
    fn test_missing_credentials_block_entry() {
        let secrets = MemorySecretStore::new();
        let metadata = MetadataStore::open_in_memory().unwrap();
        metadata.put("orphan", &profile("orphan").metadata()).unwrap();
        let registry = ConnectionRegistry::new(metadata, Box::new(secrets));

        let mut picker = ConnectionPicker::load(&registry);
        assert_eq!(picker.handle_key(key(KeyCode::Enter), &registry), Transition::Stay);
        assert!(picker.status.is_error());
    }

    #[test]
    fn test_corrupt_credentials_block_entry() {
        let secrets = MemorySecretStore::new();
        secrets.set_secret(SECRET_REALM, "bad", "not a record").unwrap();
        let metadata = MetadataStore::open_in_memory().unwrap();
        metadata.put("bad", &profile("bad").metadata()).unwrap();
        let registry = ConnectionRegistry::new(metadata, Box::new(secrets));

        let mut picker = ConnectionPicker::load(&registry);
        assert_eq!(picker.handle_key(key(KeyCode::Enter), &registry), Transition::Stay);
        assert!(picker.status.is_error());
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let registry = registry();
        registry.save(&profile("local")).unwrap();
        let mut picker = ConnectionPicker::load(&registry);

        picker.handle_key(key(KeyCode::Char('d')), &registry);
        picker.handle_key(key(KeyCode::Char('n')), &registry);
        assert_eq!(registry.list().unwrap().len(), 1);

        picker.handle_key(key(KeyCode::Char('d')), &registry);
        picker.handle_key(key(KeyCode::Char('y')), &registry);
        assert!(registry.list().unwrap().is_empty());
        assert!(picker.table.items.is_empty());
        assert!(registry.resolve_credentials("local").is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = registry();
        let mut picker = ConnectionPicker::load(&registry);
        assert_eq!(picker.handle_key(key(KeyCode::Enter), &registry), Transition::Stay);
        assert_eq!(picker.handle_key(key(KeyCode::Esc), &registry), Transition::Home);
    }
}
