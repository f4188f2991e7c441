use cgmath::BaseFloat;

/// A RGBA `Color`. Each color component is a floating point value
/// with a range from 0 to 1.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Color<S> {
    pub r: S,
    pub g: S,
    pub b: S,
    pub a: S,
}

impl Into<[u8; 4]> for Color<f32> {
    fn into(self) -> [u8; 4] {
        let v = self.clip();
        let max = 255.0;
        [
            (v.r * max) as u8,
            (v.g * max) as u8,
            (v.b * max) as u8,
            (v.a * max) as u8,
        ]
    }
}

impl<S: BaseFloat> From<[u8; 4]> for Color<S> {
    fn from(v: [u8; 4]) -> Self {
        let max = S::from(255.0).unwrap();
        Color::new(
            S::from(v[0]).unwrap() / max,
            S::from(v[1]).unwrap() / max,
            S::from(v[2]).unwrap() / max,
            S::from(v[3]).unwrap() / max,
        )
    }
}

impl<S: BaseFloat> Color<S> {
    pub fn new(r: S, g: S, b: S, a: S) -> Self {
        Color { r, g, b, a }
    }

    /// Component-wise multiplication, alpha included. This is the tinting
    /// operation used when skeleton, slot and attachment colors compose.
    pub fn modulate(&self, rhs: &Color<S>) -> Self {
        Color::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
            self.a * rhs.a,
        )
    }

    /// Returns the premultiplied-alpha encoding of this color: RGB channels
    /// scaled by alpha, alpha untouched.
    pub fn premultiplied(&self) -> Self {
        Color::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }

    /// Clip to [0.0, 1.0] range.
    pub fn clip(&self) -> Self {
        let mut color = *self;
        color.r = self.r.max(S::zero()).min(S::one());
        color.g = self.g.max(S::zero()).min(S::one());
        color.b = self.b.max(S::zero()).min(S::one());
        color.a = self.a.max(S::zero()).min(S::one());
        color
    }

    /// Truncate alpha channel.
    pub fn rgb(&self) -> [S; 3] {
        [self.r, self.g, self.b]
    }

    pub fn rgba(&self) -> [S; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl<S: BaseFloat> Color<S> {
    pub fn white() -> Self {
        Color::new(S::one(), S::one(), S::one(), S::one())
    }

    pub fn gray() -> Self {
        let half = S::from(0.5).unwrap();
        Color::new(half, half, half, S::one())
    }

    pub fn black() -> Self {
        Color::new(S::zero(), S::zero(), S::zero(), S::one())
    }

    pub fn red() -> Self {
        Color::new(S::one(), S::zero(), S::zero(), S::one())
    }

    pub fn green() -> Self {
        Color::new(S::zero(), S::one(), S::zero(), S::one())
    }

    pub fn blue() -> Self {
        Color::new(S::zero(), S::zero(), S::one(), S::one())
    }

    pub fn transparent() -> Self {
        Color::new(S::zero(), S::zero(), S::zero(), S::zero())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn modulate() {
        let skeleton = Color::<f32>::white();
        let slot = Color::new(0.5, 0.5, 0.5, 1.0);
        let attachment = Color::white();
        let v = skeleton.modulate(&slot).modulate(&attachment);
        assert_eq!(v, Color::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn premultiplied() {
        let v = Color::new(1.0f32, 0.5, 0.25, 0.5).premultiplied();
        assert_eq!(v, Color::new(0.5, 0.25, 0.125, 0.5));
    }

    #[test]
    fn clip() {
        let v = Color::new(1.5f32, -0.5, 0.5, 2.0).clip();
        assert_eq!(v, Color::new(1.0, 0.0, 0.5, 1.0));
    }
}
