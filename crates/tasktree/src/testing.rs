//! In-memory modules for exercising the tree

use crate::module::Module;
use crate::types::{Probe, Status};
use anyhow::{Result, bail};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared call journal across mock modules
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// A module whose "system state" is a boolean flag
#[derive(Debug, Clone)]
pub struct Flag {
    pub name: String,
    pub installed: Rc<RefCell<bool>>,
    pub journal: Journal,
    pub fail_install: bool,
    pub fail_remove: bool,
    /// Install reports success without changing the flag
    pub noop_install: bool,
    pub status_error: bool,
    pub unknown: bool,
}

impl Flag {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            installed: Rc::new(RefCell::new(false)),
            journal: Rc::clone(journal),
            fail_install: false,
            fail_remove: false,
            noop_install: false,
            status_error: false,
            unknown: false,
        }
    }

    pub fn installed(self) -> Self {
        *self.installed.borrow_mut() = true;
        self
    }

    pub fn is_installed(&self) -> bool {
        *self.installed.borrow()
    }
}

impl Module for Flag {
    fn id(&self) -> String {
        format!("flag {}", self.name)
    }

    fn describe(&self) -> String {
        format!("Flag {}", self.name)
    }

    fn status(&self) -> Result<Probe> {
        if self.status_error {
            bail!("cannot inspect {}", self.name);
        }
        if self.unknown {
            return Ok(Probe::new(Status::Unknown, "No way to tell."));
        }
        if self.is_installed() {
            Ok(Probe::pass("Flag is set."))
        } else {
            Ok(Probe::fail("Flag is not set."))
        }
    }

    fn install(&self) -> Result<String> {
        self.journal.borrow_mut().push(format!("install {}", self.name));
        if self.fail_install {
            bail!("install of {} failed", self.name);
        }
        if !self.noop_install {
            *self.installed.borrow_mut() = true;
        }
        Ok("Set flag.".into())
    }

    fn remove(&self) -> Result<String> {
        self.journal.borrow_mut().push(format!("remove {}", self.name));
        if self.fail_remove {
            bail!("remove of {} failed", self.name);
        }
        *self.installed.borrow_mut() = false;
        Ok("Cleared flag.".into())
    }
}

/// Journal entries as plain strings
pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}
