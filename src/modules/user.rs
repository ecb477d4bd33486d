//! Local user accounts

use crate::runner;
use anyhow::{Result, bail};
use tasktree::{Module, Probe};

/// Create a user with a home directory and, optionally, a password
///
/// Removing deletes the account (`userdel`); the home directory stays.
#[derive(Clone)]
pub struct User {
    pub name: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "*****"))
            .finish()
    }
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Whether `name` has an entry in `/etc/passwd`-formatted text
fn has_entry(passwd: &str, name: &str) -> bool {
    passwd
        .lines()
        .any(|line| line.split(':').next() == Some(name))
}

impl Module for User {
    fn id(&self) -> String {
        format!("User: {}", self.name)
    }

    fn status(&self) -> Result<Probe> {
        let (ok, output) = runner::run_combined("getent", &["passwd", &self.name])?;
        if ok && has_entry(&output, &self.name) {
            Ok(Probe::pass("User exists."))
        } else {
            Ok(Probe::fail("User does not exist."))
        }
    }

    fn install(&self) -> Result<String> {
        let (ok, output) = runner::run_combined("useradd", &["-m", &self.name])?;
        if !ok {
            bail!("Could not create user {}: {output}", self.name);
        }
        if let Some(password) = &self.password {
            let input = format!("{}:{password}\n", self.name);
            let (ok, output) = runner::run_with_input("chpasswd", &[], &input)?;
            if !ok {
                bail!("Could not set password for {}: {output}", self.name);
            }
        }
        Ok("Created user.".into())
    }

    fn remove(&self) -> Result<String> {
        let (ok, output) = runner::run_combined("userdel", &[&self.name])?;
        if !ok {
            bail!("Could not delete user {}: {output}", self.name);
        }
        Ok("Deleted user.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_entry() {
        let passwd = "root:x:0:0:root:/root:/bin/bash\ndeploy:x:1000:1000::/home/deploy:/bin/sh\n";
        assert!(has_entry(passwd, "deploy"));
        assert!(!has_entry(passwd, "dep"));
        assert!(!has_entry("", "root"));
    }

    #[test]
    fn test_password_is_hidden() {
        let user = User::new("deploy").password("hunter2");
        assert_eq!(user.id(), "User: deploy");
        assert!(!format!("{user:?}").contains("hunter2"));
    }

    #[test]
    fn test_status_of_missing_user() {
        let user = User::new("genesis-no-such-user-0123");
        // Hosts without getent cannot inspect users at all.
        if let Ok(probe) = user.status() {
            assert!(!probe.status.is_pass());
        }
    }
}
