/// Tri-state verdict of testing an occludee against an occluder.
///
/// Variants are ordered from most hidden to most visible
/// (`None < Partial < Full`), so callers can compare verdicts directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    /// The occludee is entirely hidden behind the occluder.
    None,
    /// The occludee straddles the occluder's silhouette or intersects the
    /// occluder.
    Partial,
    /// The occludee is entirely unobstructed.
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_from_hidden_to_visible() {
        assert!(Visibility::None < Visibility::Partial);
        assert!(Visibility::Partial < Visibility::Full);
    }
}
