// src/matching/rules.rs

//! Equivalence rules between a local release and a remote one.
//!
//! All predicates treat a missing field as "matches anything".

use crate::models::{Category, MediaRelease, Resolution, Tag};
use crate::utils::parse::parse_height;

/// Codec/container names different sites print for the same thing.
const CODEC_ALIASES: [(&str, &str); 4] = [
    ("H.264", "x264"),
    ("H.265", "x265"),
    ("UHD100", "BD100"),
    ("UHD66", "BD66"),
];

/// Raw resolution labels that mean standard definition.
const SD_LABELS: [&str; 3] = ["SD", "PAL", "NTSC"];

/// Whether two codec/container identifiers denote the same encode family.
pub fn codec_equivalent(a: &str, b: &str) -> bool {
    a == b
        || CODEC_ALIASES
            .iter()
            .any(|&(x, y)| (a == x && b == y) || (a == y && b == x))
}

/// Whether a resolution is standard definition (below 720 lines).
pub fn is_sd(resolution: &Resolution) -> bool {
    match resolution.normalized() {
        Resolution::Sd => true,
        Resolution::Other(raw) => {
            SD_LABELS.contains(&raw.trim().to_uppercase().as_str())
                || parse_height(&raw).is_some_and(|h| h < 720)
        }
        Resolution::Hd | Resolution::Fhd | Resolution::Uhd => false,
    }
}

/// Whether two resolutions may describe the same release.
pub fn resolution_compatible(a: Option<&Resolution>, b: Option<&Resolution>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return true;
    };
    let (a, b) = (a.normalized(), b.normalized());
    if a == b {
        return true;
    }
    if a == Resolution::Sd {
        return is_sd(&b);
    }
    if b == Resolution::Sd {
        return is_sd(&a);
    }
    false
}

/// A Remux only matches another Remux; anything else matches freely.
pub fn tag_compatible(local: &MediaRelease, remote: &MediaRelease) -> bool {
    !local.has_tag(Tag::Remux) || remote.has_tag(Tag::Remux)
}

/// Category policy gate. A missing category is let through.
pub fn is_eligible_category(category: Option<Category>, allowed: &[Category]) -> bool {
    category.is_none_or(|c| allowed.contains(&c))
}

/// Encoding policy gate: x265 is only accepted for UHD or HDR/DV releases.
pub fn is_allowed_encoding(release: &MediaRelease) -> bool {
    let is_uhd = release
        .resolution
        .as_ref()
        .is_some_and(|r| r.normalized() == Resolution::Uhd);
    !(release.codec.as_deref() == Some("x265") && !is_uhd && !release.is_hdr())
}

/// Whether `remote` is similar enough to `local` to be the same slot.
pub fn is_similar(local: &MediaRelease, remote: &MediaRelease) -> bool {
    let codec_matches = match (local.codec.as_deref(), remote.codec.as_deref()) {
        (None, _) => true,
        (Some(local), Some(remote)) => codec_equivalent(local, remote),
        (Some(_), None) => false,
    };
    resolution_compatible(local.resolution.as_ref(), remote.resolution.as_ref())
        && codec_matches
        && tag_compatible(local, remote)
}

/// Whether two sizes differ by at least `ratio` in either direction.
pub fn sizes_distinct(a: f64, b: f64, ratio: f64) -> bool {
    a >= b * ratio || b >= a * ratio
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn release(resolution: Option<Resolution>, codec: Option<&str>, tags: &[Tag]) -> MediaRelease {
        MediaRelease {
            resolution,
            codec: codec.map(str::to_string),
            tags: tags.iter().copied().collect::<BTreeSet<_>>(),
            ..MediaRelease::default()
        }
    }

    #[test]
    fn test_codec_equivalent_is_symmetric() {
        for (a, b) in CODEC_ALIASES {
            assert!(codec_equivalent(a, b));
            assert!(codec_equivalent(b, a));
        }
        assert!(codec_equivalent("x264", "x264"));
        assert!(!codec_equivalent("x264", "x265"));
        assert!(!codec_equivalent("H.264", "H.265"));
        assert!(!codec_equivalent("BD66", "BD100"));
    }

    #[test]
    fn test_resolution_absent_is_wildcard() {
        let classes = [
            Resolution::Sd,
            Resolution::Hd,
            Resolution::Fhd,
            Resolution::Uhd,
            Resolution::Other("576i".into()),
        ];
        for class in &classes {
            assert!(resolution_compatible(None, Some(class)));
            assert!(resolution_compatible(Some(class), None));
        }
        assert!(resolution_compatible(None, None));
    }

    #[test]
    fn test_resolution_compatible_classes() {
        assert!(resolution_compatible(Some(&Resolution::Fhd), Some(&Resolution::Fhd)));
        assert!(!resolution_compatible(Some(&Resolution::Fhd), Some(&Resolution::Uhd)));
        assert!(resolution_compatible(
            Some(&Resolution::Fhd),
            Some(&Resolution::Other("1080p".into()))
        ));
    }

    #[test]
    fn test_resolution_sd_fallbacks() {
        let sd = Resolution::Sd;
        assert!(resolution_compatible(Some(&sd), Some(&Resolution::Other("PAL".into()))));
        assert!(resolution_compatible(Some(&Resolution::Other("NTSC".into())), Some(&sd)));
        assert!(resolution_compatible(Some(&sd), Some(&Resolution::Other("720x576".into()))));
        assert!(resolution_compatible(Some(&sd), Some(&Resolution::Other("576p".into()))));
        assert!(!resolution_compatible(Some(&sd), Some(&Resolution::Hd)));
        assert!(!resolution_compatible(Some(&sd), Some(&Resolution::Other("WEB".into()))));
    }

    #[test]
    fn test_tag_compatible_remux_gate() {
        let remux = release(None, None, &[Tag::Remux]);
        let encode = release(None, None, &[]);
        assert!(tag_compatible(&remux, &remux));
        assert!(!tag_compatible(&remux, &encode));
        assert!(tag_compatible(&encode, &remux));
        assert!(tag_compatible(&encode, &encode));
    }

    #[test]
    fn test_eligible_category() {
        let allowed = [Category::Movie, Category::Documentary, Category::LivePerformance];
        assert!(is_eligible_category(None, &allowed));
        assert!(is_eligible_category(Some(Category::Movie), &allowed));
        assert!(is_eligible_category(Some(Category::LivePerformance), &allowed));
        assert!(!is_eligible_category(Some(Category::Sport), &allowed));
        assert!(!is_eligible_category(Some(Category::Tv), &allowed));
    }

    #[test]
    fn test_allowed_encoding() {
        assert!(!is_allowed_encoding(&release(Some(Resolution::Fhd), Some("x265"), &[])));
        assert!(!is_allowed_encoding(&release(None, Some("x265"), &[])));
        assert!(is_allowed_encoding(&release(Some(Resolution::Uhd), Some("x265"), &[])));
        assert!(is_allowed_encoding(&release(Some(Resolution::Fhd), Some("x265"), &[Tag::Hdr])));
        assert!(is_allowed_encoding(&release(Some(Resolution::Fhd), Some("x265"), &[Tag::Dv])));
        assert!(is_allowed_encoding(&release(Some(Resolution::Fhd), Some("x264"), &[])));
        assert!(is_allowed_encoding(&release(None, None, &[])));
    }

    #[test]
    fn test_allowed_encoding_from_names_with_hd_audio() {
        let uhd = MediaRelease::from_name("Heat.1995.2160p.UHD.BluRay.DTS-HD.MA.7.1.x265-GRP", None);
        assert_eq!(uhd.resolution, Some(Resolution::Uhd));
        assert!(is_allowed_encoding(&uhd));

        let fhd = MediaRelease::from_name("Heat.1995.1080p.BluRay.DTS-HD.MA.5.1.x264-GRP", None);
        let remote = MediaRelease::from_name("Heat 1995 1080p BluRay H.264", None);
        assert!(is_similar(&fhd, &remote));
    }

    #[test]
    fn test_is_similar_codec_wildcard() {
        let local = release(Some(Resolution::Fhd), None, &[]);
        let remote = release(Some(Resolution::Fhd), Some("x265"), &[]);
        assert!(is_similar(&local, &remote));

        let local = release(Some(Resolution::Fhd), Some("x264"), &[]);
        assert!(!is_similar(&local, &remote));
        let remote = release(Some(Resolution::Fhd), Some("H.264"), &[]);
        assert!(is_similar(&local, &remote));
    }

    #[test]
    fn test_sizes_distinct() {
        assert!(!sizes_distinct(8000.0, 8200.0, 1.5));
        assert!(sizes_distinct(8000.0, 3000.0, 1.5));
        assert!(sizes_distinct(3000.0, 4500.0, 1.5));
        assert!(!sizes_distinct(3000.0, 4499.0, 1.5));
    }
}
