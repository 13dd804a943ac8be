/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub elevator: ElevatorConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Id of a door object in the scene.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DoorRef(pub String);

impl DoorRef {
    pub fn new(id: impl Into<String>) -> DoorRef {
        DoorRef(id.into())
    }
}

impl fmt::Display for DoorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct FloorConfig {
    pub height: f64,
    pub left_door: DoorRef,
    pub right_door: DoorRef,
}

/**
 * Settings of one elevator car.
 *
 * # Fields
 * - `speed`:                       Vertical travel speed of the car, units per second.
 * - `door_open_width`:             How far each door half slides out from the centre.
 * - `door_open_speed`:             Door slide speed, units per second.
 * - `dwell_seconds`:               How long the doors stay open when serving a floor.
 * - `idle_return_delay_seconds`:   Idle time before the car returns to the ground floor.
 * - `allow_changing_direction_when_occupied`: Serve hall calls in either direction while
 *                                  passengers are aboard.
 * - `door_self_test`:              Open and close the doors once at startup.
 * - `car_left_door`, `car_right_door`: The car's own door pair.
 * - `floors`:                      Floor records, ground floor first.
 */
#[derive(Deserialize, Clone, Debug)]
pub struct ElevatorConfig {
    pub speed: f64,
    pub door_open_width: f64,
    pub door_open_speed: f64,
    #[serde(default = "default_dwell_seconds")]
    pub dwell_seconds: f64,
    #[serde(default = "default_idle_return_delay_seconds")]
    pub idle_return_delay_seconds: f64,
    #[serde(default)]
    pub allow_changing_direction_when_occupied: bool,
    #[serde(default = "default_door_self_test")]
    pub door_self_test: bool,
    #[serde(default = "default_car_left_door")]
    pub car_left_door: DoorRef,
    #[serde(default = "default_car_right_door")]
    pub car_right_door: DoorRef,
    #[serde(default)]
    pub floors: Vec<FloorConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SimulationConfig {
    /// Virtual seconds per wall-clock second.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            time_scale: default_time_scale(),
            tick_ms: default_tick_ms(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("elevator has no floors configured")]
    NoFloors,
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: f64 },
}

/***************************************/
/*             Public API              */
/***************************************/
impl ElevatorConfig {
    /// Configuration with default doors and timings for floors at the given heights.
    pub fn with_heights(heights: &[f64]) -> ElevatorConfig {
        ElevatorConfig {
            speed: 4.0,
            door_open_width: 2.0,
            door_open_speed: 1.0,
            dwell_seconds: default_dwell_seconds(),
            idle_return_delay_seconds: default_idle_return_delay_seconds(),
            allow_changing_direction_when_occupied: false,
            door_self_test: default_door_self_test(),
            car_left_door: default_car_left_door(),
            car_right_door: default_car_right_door(),
            floors: heights
                .iter()
                .enumerate()
                .map(|(i, &height)| FloorConfig {
                    height,
                    left_door: DoorRef(format!("shaft-{i}-left")),
                    right_door: DoorRef(format!("shaft-{i}-right")),
                })
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floors.is_empty() {
            return Err(ConfigError::NoFloors);
        }

        for (i, floor) in self.floors.iter().enumerate() {
            if !floor.height.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: format!("floors[{i}].height"),
                    value: floor.height,
                });
            }
        }

        let positive = [
            ("speed", self.speed),
            ("door_open_width", self.door_open_width),
            ("door_open_speed", self.door_open_speed),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value,
                });
            }
        }

        let non_negative = [
            ("dwell_seconds", self.dwell_seconds),
            ("idle_return_delay_seconds", self.idle_return_delay_seconds),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value,
                });
            }
            seconds(field, value)?;
        }

        // Every wait the controller schedules has to fit in a Duration
        seconds("door_open_width", self.door_open_width / self.door_open_speed)?;
        for (i, pair) in self.floors.windows(2).enumerate() {
            let field = format!("floors[{}].height", i + 1);
            seconds(&field, (pair[1].height - pair[0].height).abs() / self.speed)?;
        }

        Ok(())
    }

    pub fn dwell(&self) -> Duration {
        saturating_secs(self.dwell_seconds)
    }

    pub fn idle_return_delay(&self) -> Duration {
        saturating_secs(self.idle_return_delay_seconds)
    }

    /// Time for a door half to slide fully open or fully closed.
    pub fn door_travel_time(&self) -> Duration {
        saturating_secs(self.door_open_width / self.door_open_speed)
    }
}

/// Converts seconds to a `Duration`, clamping to zero below and to `Duration::MAX` above.
pub fn saturating_secs(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    })
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(config_str)?)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&config_str)?;
    config.elevator.validate()?;
    Ok(config)
}

/***************************************/
/*              Defaults               */
/***************************************/
fn default_dwell_seconds() -> f64 {
    5.0
}

fn default_idle_return_delay_seconds() -> f64 {
    5.0
}

fn default_door_self_test() -> bool {
    true
}

fn default_car_left_door() -> DoorRef {
    DoorRef::new("car-left")
}

fn default_car_right_door() -> DoorRef {
    DoorRef::new("car-right")
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_tick_ms() -> u64 {
    50
}

/***************************************/
/*             Unit tests              */
/***************************************/
