use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Geographic waypoint identified by its postal code.
///
/// Equality and hashing only look at the identifier, so two records with the
/// same code but slightly different coordinates are the same stop.
#[derive(Debug, Clone)]
pub struct Waypoint {
    id: Arc<str>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    pub fn new(id: impl Into<Arc<str>>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared handle to the identifier, cheap to clone into logs.
    pub fn shared_id(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    pub fn is(&self, id: &str) -> bool {
        &*self.id == id
    }
}

impl PartialEq for Waypoint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Waypoint {}

impl Hash for Waypoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.6}, {:.6})", self.id, self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::Waypoint;
    use std::collections::HashSet;

    #[test]
    fn identity_is_the_postal_code() {
        let a = Waypoint::new("82821020", -25.4, -49.2);
        let b = Waypoint::new("82821020", 0.0, 0.0);
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
