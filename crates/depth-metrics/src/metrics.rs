//! Per-sample metrics

use ndarray::Zip;
use serde::{Deserialize, Serialize};
use tactile_frame::{ContactMask, HeightMap};

use crate::MetricError;

/// Millimeters per height-field pixel unit of the DIGIT gel
pub const DEFAULT_PIXEL_TO_MM: f64 = 0.03;

/// What IoU to report when both masks are empty (0/0)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyMaskPolicy {
    /// Record NaN; dropped when averaging
    #[default]
    Exclude,
    /// Two empty masks agree perfectly
    Perfect,
    /// Count as a total miss
    Zero,
}

impl EmptyMaskPolicy {
    fn empty_union_value(self) -> f64 {
        match self {
            EmptyMaskPolicy::Exclude => f64::NAN,
            EmptyMaskPolicy::Perfect => 1.0,
            EmptyMaskPolicy::Zero => 0.0,
        }
    }
}

/// Root-mean-square height error in millimeters.
///
/// An empty field has no mean and yields NaN.
pub fn heightmap_rmse(
    prediction: &HeightMap,
    ground_truth: &HeightMap,
    pixel_to_mm: f64,
) -> Result<f64, MetricError> {
    if prediction.dim() != ground_truth.dim() {
        return Err(MetricError::ShapeMismatch {
            metric: "rmse",
            prediction: prediction.dim(),
            ground_truth: ground_truth.dim(),
        });
    }

    let mut sum_sq = 0.0f64;
    Zip::from(prediction.values())
        .and(ground_truth.values())
        .for_each(|&p, &g| {
            let err = (f64::from(p) - f64::from(g)).abs() * pixel_to_mm;
            sum_sq += err * err;
        });

    let n = prediction.values().len() as f64;
    Ok((sum_sq / n).sqrt())
}

/// Intersection over union of two contact masks.
///
/// The union is `|pred| + |gt| - |pred ∩ gt|`; when it is zero the policy decides.
pub fn contact_iou(
    prediction: &ContactMask,
    ground_truth: &ContactMask,
    policy: EmptyMaskPolicy,
) -> Result<f64, MetricError> {
    let intersection = prediction
        .intersection_count(ground_truth)
        .map_err(|_| MetricError::ShapeMismatch {
            metric: "iou",
            prediction: prediction.dim(),
            ground_truth: ground_truth.dim(),
        })?;
    let union = prediction.count() + ground_truth.count() - intersection;

    if union == 0 {
        return Ok(policy.empty_union_value());
    }
    Ok(intersection as f64 / union as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use proptest::prelude::*;

    #[test]
    fn test_identical_heightmaps_zero_rmse() {
        let h = HeightMap::from_array(array![[0.0, 3.5], [10.0, 2.0]]);
        assert_eq!(heightmap_rmse(&h, &h, DEFAULT_PIXEL_TO_MM).unwrap(), 0.0);
    }

    #[test]
    fn test_rmse_scales_to_millimeters() {
        let pred = HeightMap::from_array(array![[10.0, 10.0], [10.0, 10.0]]);
        let gt = HeightMap::zeros(2, 2);
        let rmse = heightmap_rmse(&pred, &gt, 0.03).unwrap();
        assert!((rmse - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_rmse_shape_mismatch() {
        let err = heightmap_rmse(&HeightMap::zeros(2, 2), &HeightMap::zeros(3, 2), 1.0).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch { metric: "rmse", .. }));
    }

    #[test]
    fn test_equal_masks_iou_one() {
        let m = ContactMask::from_array(array![[true, false], [true, true]]);
        assert_eq!(contact_iou(&m, &m, EmptyMaskPolicy::Exclude).unwrap(), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        let a = ContactMask::from_array(array![[true, true], [false, false]]);
        let b = ContactMask::from_array(array![[true, false], [true, false]]);
        // 1 shared pixel over 3 covered
        let iou = contact_iou(&a, &b, EmptyMaskPolicy::Exclude).unwrap();
        assert!((iou - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_both_empty_follows_policy() {
        let empty = ContactMask::empty(4, 4);
        assert!(contact_iou(&empty, &empty, EmptyMaskPolicy::Exclude).unwrap().is_nan());
        assert_eq!(contact_iou(&empty, &empty, EmptyMaskPolicy::Perfect).unwrap(), 1.0);
        assert_eq!(contact_iou(&empty, &empty, EmptyMaskPolicy::Zero).unwrap(), 0.0);
    }

    #[test]
    fn test_one_empty_mask_is_zero() {
        let empty = ContactMask::empty(2, 2);
        let full = ContactMask::from_array(Array2::from_elem((2, 2), true));
        assert_eq!(contact_iou(&empty, &full, EmptyMaskPolicy::Exclude).unwrap(), 0.0);
    }

    fn mask_pair() -> impl Strategy<Value = (ContactMask, ContactMask)> {
        (
            prop::collection::vec(any::<bool>(), 20),
            prop::collection::vec(any::<bool>(), 20),
        )
            .prop_map(|(a, b)| {
                (
                    ContactMask::from_array(Array2::from_shape_vec((4, 5), a).unwrap()),
                    ContactMask::from_array(Array2::from_shape_vec((4, 5), b).unwrap()),
                )
            })
    }

    proptest! {
        #[test]
        fn prop_iou_in_unit_interval((a, b) in mask_pair()) {
            let iou = contact_iou(&a, &b, EmptyMaskPolicy::Exclude).unwrap();
            if !iou.is_nan() {
                prop_assert!((0.0..=1.0).contains(&iou));
            } else {
                prop_assert!(a.is_empty() && b.is_empty());
            }
        }

        #[test]
        fn prop_rmse_non_negative(
            pred in prop::collection::vec(-100.0f32..100.0, 12),
            gt in prop::collection::vec(-100.0f32..100.0, 12),
        ) {
            let pred = HeightMap::from_vec(4, 3, pred).unwrap();
            let gt = HeightMap::from_vec(4, 3, gt).unwrap();
            prop_assert!(heightmap_rmse(&pred, &gt, DEFAULT_PIXEL_TO_MM).unwrap() >= 0.0);
        }
    }
}
