/// Channel layout of the LEDs in a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedProfile {
    RGB,
    RGBW,
}

impl LedProfile {
    /// Number of bytes one LED occupies on the wire.
    pub fn bytes_per_led(&self) -> usize {
        match self {
            LedProfile::RGB => 3,
            LedProfile::RGBW => 4,
        }
    }

    pub fn has_white(&self) -> bool {
        matches!(self, LedProfile::RGBW)
    }

    pub fn from_bytes_per_led(bytes_per_led: usize) -> Option<LedProfile> {
        match bytes_per_led {
            3 => Some(LedProfile::RGB),
            4 => Some(LedProfile::RGBW),
            _ => None,
        }
    }
}

/// A single colour sample, with or without a dedicated white channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {
    Rgb { red: u8, green: u8, blue: u8 },
    Rgbw {
        red: u8,
        green: u8,
        blue: u8,
        white: u8,
    },
}

impl Pixel {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Pixel::Rgb { red, green, blue }
    }

    pub fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Pixel::Rgbw {
            red,
            green,
            blue,
            white,
        }
    }

    pub fn red(&self) -> u8 {
        match *self {
            Pixel::Rgb { red, .. } | Pixel::Rgbw { red, .. } => red,
        }
    }

    pub fn green(&self) -> u8 {
        match *self {
            Pixel::Rgb { green, .. } | Pixel::Rgbw { green, .. } => green,
        }
    }

    pub fn blue(&self) -> u8 {
        match *self {
            Pixel::Rgb { blue, .. } | Pixel::Rgbw { blue, .. } => blue,
        }
    }

    /// The white channel; RGB pixels report 0.
    pub fn white(&self) -> u8 {
        match *self {
            Pixel::Rgb { .. } => 0,
            Pixel::Rgbw { white, .. } => white,
        }
    }

    pub fn has_white(&self) -> bool {
        self.profile().has_white()
    }

    pub fn profile(&self) -> LedProfile {
        match self {
            Pixel::Rgb { .. } => LedProfile::RGB,
            Pixel::Rgbw { .. } => LedProfile::RGBW,
        }
    }
}

impl From<(u8, u8, u8)> for Pixel {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Pixel::rgb(red, green, blue)
    }
}

impl From<(u8, u8, u8, u8)> for Pixel {
    fn from((red, green, blue, white): (u8, u8, u8, u8)) -> Self {
        Pixel::rgbw(red, green, blue, white)
    }
}

/// One snapshot of every LED in the string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub leds: Vec<Pixel>,
}

impl Frame {
    pub fn new(leds: Vec<Pixel>) -> Self {
        Frame { leds }
    }

    /// A frame with every LED set to the same colour.
    pub fn solid(pixel: Pixel, number_of_led: usize) -> Self {
        Frame {
            leds: vec![pixel; number_of_led],
        }
    }

    pub fn len(&self) -> usize {
        self.leds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leds.is_empty()
    }
}

impl FromIterator<Pixel> for Frame {
    fn from_iter<I: IntoIterator<Item = Pixel>>(iter: I) -> Self {
        Frame {
            leds: iter.into_iter().collect(),
        }
    }
}

/// Ordered frames of a movie, as played back by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedMovie {
    pub frames: Vec<Frame>,
}

impl LedMovie {
    pub fn new(frames: Vec<Frame>) -> Self {
        LedMovie { frames }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// LED count of the first frame; 0 for an empty movie.
    pub fn leds_per_frame(&self) -> usize {
        self.frames.first().map_or(0, Frame::len)
    }

    /// Profile of the first LED, if any.
    pub fn profile(&self) -> Option<LedProfile> {
        self.frames
            .iter()
            .flat_map(|frame| frame.leds.first())
            .next()
            .map(Pixel::profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_reports_no_white() {
        let pixel = Pixel::rgb(1, 2, 3);
        assert_eq!((pixel.red(), pixel.green(), pixel.blue()), (1, 2, 3));
        assert_eq!(pixel.white(), 0);
        assert!(!pixel.has_white());
    }

    #[test]
    fn test_rgbw_channels() {
        let pixel: Pixel = (10, 20, 30, 40).into();
        assert_eq!(pixel.white(), 40);
        assert!(pixel.has_white());
        assert_eq!(pixel.profile().bytes_per_led(), 4);
    }

    #[test]
    fn test_movie_shape() {
        let movie = LedMovie::new(vec![Frame::solid(Pixel::rgb(0, 0, 0), 5); 2]);
        assert_eq!(movie.frame_count(), 2);
        assert_eq!(movie.leds_per_frame(), 5);
        assert_eq!(movie.profile(), Some(LedProfile::RGB));
        assert_eq!(LedMovie::default().profile(), None);
    }
}
