use shenji_core::fortune::entity::ElementProfile;
use shenji_core::ganzhi::element::ElementSet;
use shenji_core::ganzhi::{Branch, Stem};

/// # Summary
/// 依月令判定日主强弱并给出喜忌五行。
///
/// # Logic
/// 1. 月支五行与日主相同，或为生日主者（印），判为身强。
/// 2. 身强：喜食伤、财、官杀；忌印与比劫。
/// 3. 身弱：喜比劫与印；忌食伤、财、官杀。
///
/// # Arguments
/// * `day_master`: 日柱天干。
/// * `month_branch`: 月柱地支。
///
/// # Returns
/// 喜忌互不相交的 `ElementProfile`。
pub fn classify(day_master: Stem, month_branch: Branch) -> ElementProfile {
    let dm = day_master.element();
    let season = month_branch.element();
    let rel = dm.relations();
    let strong = season == dm || season == rel.weaken;

    let outward = ElementSet::from_elements(&[rel.generate, rel.control, rel.damage]);
    let support = ElementSet::from_elements(&[dm, rel.weaken]);
    let (favored, avoided) = if strong {
        (outward, support)
    } else {
        (support, outward)
    };

    ElementProfile {
        day_master: dm,
        strong,
        favored,
        avoided,
    }
}
