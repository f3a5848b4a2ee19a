use rand::Rng;
use uuid::{Builder, Uuid};

/// A v4 UUID whose bytes come from `rng`, so a seeded session issues the
/// same ids on every run.
pub fn random_uuid(rng: &mut impl Rng) -> Uuid {
    Builder::from_random_bytes(rng.random()).into_uuid()
}

/// `"{prefix}-{uuid}"`, the id format shared by every registry.
pub fn generate(prefix: &str, rng: &mut impl Rng) -> String {
    format!("{prefix}-{}", random_uuid(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_prefix_and_version() {
        let mut rng = SmallRng::seed_from_u64(42);
        let id = generate("fluid", &mut rng);
        assert!(id.starts_with("fluid-"));
        let uuid = Uuid::parse_str(&id["fluid-".len()..]).unwrap();
        assert_eq!(uuid.get_version_num(), 4);
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let a = generate("node", &mut SmallRng::seed_from_u64(7));
        let b = generate("node", &mut SmallRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_successive_ids_differ() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_ne!(generate("dna", &mut rng), generate("dna", &mut rng));
    }
}
