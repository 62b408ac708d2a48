use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.,
            out_tangent: 0.,
        }
    }
}

/// Keyframed scalar curve with cubic Hermite segments. Sampling outside the key range clamps to
/// the first or last key.
#[derive(Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct KeyframeCurve {
    keys: Vec<CurveKey>,
}

impl KeyframeCurve {
    /// Keys are sorted by time.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Curve through `points` with straight segments (tangents set to the segment slopes).
    pub fn linear(points: &[(f32, f32)]) -> Self {
        let mut curve = Self::new(points.iter().map(|&(t, v)| CurveKey::new(t, v)).collect());
        let slopes: Vec<f32> = curve
            .keys
            .windows(2)
            .map(|w| {
                let dt = w[1].time - w[0].time;
                if dt > 0. {
                    (w[1].value - w[0].value) / dt
                } else {
                    0.
                }
            })
            .collect();
        for (i, slope) in slopes.into_iter().enumerate() {
            curve.keys[i].out_tangent = slope;
            curve.keys[i + 1].in_tangent = slope;
        }
        curve
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![CurveKey::new(0., value)])
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Time of the last key, or 0 for an empty curve.
    pub fn end_time(&self) -> f32 {
        self.keys.last().map_or(0., |k| k.time)
    }

    pub fn sample(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let next = self.keys.partition_point(|k| k.time <= time);
        let k0 = self.keys[next - 1];
        let k1 = self.keys[next];
        let dt = k1.time - k0.time;
        if dt <= 0. {
            return k1.value;
        }

        let s = (time - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2. * s3 - 3. * s2 + 1.;
        let h10 = s3 - 2. * s2 + s;
        let h01 = -2. * s3 + 3. * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

impl From<Vec<CurveKey>> for KeyframeCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<KeyframeCurve> for Vec<CurveKey> {
    fn from(curve: KeyframeCurve) -> Self {
        curve.keys
    }
}
