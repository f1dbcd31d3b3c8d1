//! Edit styles: how an edit to one joint carries over to its mirror partner

use glam::{DQuat, DVec3};

use crate::axis::mirror_rotation;

/// Policy applied to the mirror partner when a joint is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeflectionStyle {
    /// Edit the named joint only
    #[default]
    None,
    /// The partner moves as the physical mirror image
    Mirror,
    /// The partner makes the same motion
    Sympathetic,
    /// Rotations accumulate onto the named joint; the partner is untouched
    Delta,
}

/// What to do with the partner of an edited joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartnerEdit<T> {
    Untouched,
    Set(T),
}

impl DeflectionStyle {
    /// Whether undo, redo and reset should also act on the partner
    pub fn propagates(self) -> bool {
        self != Self::None
    }

    /// Partner rotation after the edited joint was given `applied`
    pub fn partner_rotation(self, applied: DQuat) -> PartnerEdit<DQuat> {
        match self {
            Self::None | Self::Delta => PartnerEdit::Untouched,
            Self::Sympathetic => PartnerEdit::Set(applied),
            Self::Mirror => PartnerEdit::Set(mirror_rotation(applied)),
        }
    }

    /// Partner position after the edited joint moved from `previous` to `applied`
    pub fn partner_position(
        self,
        previous: DVec3,
        applied: DVec3,
        partner: DVec3,
    ) -> PartnerEdit<DVec3> {
        let delta = previous - applied;
        match self {
            Self::None | Self::Delta => PartnerEdit::Untouched,
            Self::Sympathetic => PartnerEdit::Set(partner - delta),
            Self::Mirror => PartnerEdit::Set(partner + delta),
        }
    }

    /// Partner scale after the edited joint was given `applied`
    ///
    /// Scale has no sign to mirror, so every propagating style copies it.
    pub fn partner_scale(self, applied: DVec3) -> PartnerEdit<DVec3> {
        if self.propagates() {
            PartnerEdit::Set(applied)
        } else {
            PartnerEdit::Untouched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PREVIOUS: DVec3 = DVec3::new(0.0, 0.1, 0.0);
    const APPLIED: DVec3 = DVec3::new(0.0, 0.3, 0.05);
    const PARTNER: DVec3 = DVec3::new(0.0, -0.1, 0.0);

    #[test_case(DeflectionStyle::None, PartnerEdit::Untouched ; "none")]
    #[test_case(DeflectionStyle::Delta, PartnerEdit::Untouched ; "delta")]
    #[test_case(DeflectionStyle::Sympathetic, PartnerEdit::Set(DVec3::new(0.0, 0.1, 0.05)) ; "sympathetic")]
    #[test_case(DeflectionStyle::Mirror, PartnerEdit::Set(DVec3::new(0.0, -0.3, -0.05)) ; "mirror")]
    fn test_partner_position(style: DeflectionStyle, expected: PartnerEdit<DVec3>) {
        let edit = style.partner_position(PREVIOUS, APPLIED, PARTNER);
        match (edit, expected) {
            (PartnerEdit::Set(actual), PartnerEdit::Set(expected)) => {
                assert!((actual - expected).abs().max_element() < 1e-12);
            }
            (actual, expected) => assert_eq!(actual, expected),
        }
    }

    #[test_case(DeflectionStyle::None, false ; "none")]
    #[test_case(DeflectionStyle::Delta, true ; "delta")]
    #[test_case(DeflectionStyle::Sympathetic, true ; "sympathetic")]
    #[test_case(DeflectionStyle::Mirror, true ; "mirror")]
    fn test_partner_scale(style: DeflectionStyle, copied: bool) {
        let scale = DVec3::splat(1.25);
        let expected = if copied {
            PartnerEdit::Set(scale)
        } else {
            PartnerEdit::Untouched
        };
        assert_eq!(style.partner_scale(scale), expected);
    }

    #[test]
    fn test_partner_rotation() {
        let q = DQuat::from_rotation_y(0.7);
        assert_eq!(
            DeflectionStyle::Sympathetic.partner_rotation(q),
            PartnerEdit::Set(q)
        );
        assert_eq!(
            DeflectionStyle::Mirror.partner_rotation(q),
            PartnerEdit::Set(mirror_rotation(q))
        );
        assert_eq!(
            DeflectionStyle::Delta.partner_rotation(q),
            PartnerEdit::Untouched
        );
        assert_eq!(
            DeflectionStyle::None.partner_rotation(q),
            PartnerEdit::Untouched
        );
    }
}
