//! Comfort classification of a temperature/humidity reading.

use crate::error::SensorError;
use crate::hardware::{Climate, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Comfort {
    Good,
    Moderate,
    Bad,
}

impl Comfort {
    pub fn color(self) -> Rgb {
        match self {
            Comfort::Good => Rgb::GREEN,
            Comfort::Moderate => Rgb(255, 255, 0),
            Comfort::Bad => Rgb::RED,
        }
    }
}

pub fn classify(reading: &Climate) -> Comfort {
    let Climate { celsius: t, humidity: h } = *reading;

    if (18.0..=22.0).contains(&t) && (40.0..=60.0).contains(&h) {
        Comfort::Good
    } else if (15.0..=27.0).contains(&t) && ((30.0..40.0).contains(&h) || (h > 60.0 && h <= 70.0)) {
        Comfort::Moderate
    } else {
        Comfort::Bad
    }
}

/// Backlight color and two-line text for the climate screen
pub fn screen(reading: Result<Climate, SensorError>) -> (Rgb, String) {
    match reading.and_then(Climate::validated) {
        Ok(climate) => {
            let comfort = classify(&climate);
            let text = format!(
                "Status:{comfort}\nT:{:4.1}C H:{:4.1}%",
                climate.celsius, climate.humidity
            );
            (comfort.color(), text)
        }
        Err(e) => {
            log::warn!("climate sensor: {e}");
            (Rgb::RED, "Sensor Error".to_string())
        }
    }
}
