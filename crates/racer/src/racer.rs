//! The running racer
//!
//! Builds the car, the drivers, the navigation source and the race machine
//! from configuration, then routes operator messages into them.

use std::time::Duration;

use car::{Car, CarEngine};
use driving::{CarDrivingService, ManualDriver};
use navigation::{
    filter_by_slope, FixedPathSource, LineNavigationSource, LineNavigator, LineSegment,
    NavigationFeed,
};
use race_control::RaceControlService;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::deadman::DeadmanSwitch;
use crate::events::{OperatorMessage, RaceControlType};
use crate::settings::{NavigationMode, RacerConfig};
use crate::RacerError;

/// Frames waiting for the steering task; older frames are dropped when full
const FRAME_BUFFER: usize = 2;

struct VisionInput {
    frames: mpsc::Sender<Vec<LineSegment>>,
    min_slope: f64,
    max_slope: f64,
}

/// A wired-up race car
pub struct Racer {
    race: RaceControlService,
    manual: ManualDriver,
    vision: Option<VisionInput>,
    deadman: Option<DeadmanSwitch>,
    tasks: Vec<JoinHandle<()>>,
}

impl Racer {
    /// Build every component and put the manual driver behind the wheel
    pub async fn start(config: &RacerConfig, engine: Box<dyn CarEngine>) -> Result<Self, RacerError> {
        let operator_timeout = config.operator_timeout()?;
        let car = Car::new(engine, config.car.clone());
        let driving = CarDrivingService::new(car, config.driver.status_buffer);
        let feed = NavigationFeed::default();
        let manual = ManualDriver::new(&config.driver);

        let mut tasks = Vec::new();
        let vision = match &config.navigation {
            NavigationMode::FixedPath {
                interval_ms,
                headings,
            } => {
                let source = FixedPathSource::new(Duration::from_millis(*interval_ms), headings.clone())?;
                tasks.push(source.spawn(feed.clone()));
                None
            }
            NavigationMode::Vision {
                min_slope,
                max_slope,
            } => {
                let navigator = LineNavigator::new(config.steering.clone())?;
                let (frames, rx) = mpsc::channel(FRAME_BUFFER);
                tasks.push(LineNavigationSource::spawn(rx, navigator, feed.clone()));
                Some(VisionInput {
                    frames,
                    min_slope: *min_slope,
                    max_slope: *max_slope,
                })
            }
        };

        let race = RaceControlService::from_config(
            driving,
            manual.clone(),
            feed,
            &config.driver,
            &config.race,
        )
        .await?;

        tasks.push(spawn_status_logging(&race));

        let deadman = operator_timeout.map(|timeout| {
            let (deadman, handle) = DeadmanSwitch::spawn(timeout, race.clone());
            tasks.push(handle);
            deadman
        });
        info!("Racer ready, navigation: {:?}", config.navigation);

        Ok(Self {
            race,
            manual,
            vision,
            deadman,
            tasks,
        })
    }

    pub fn race(&self) -> &RaceControlService {
        &self.race
    }

    pub fn deadman(&self) -> Option<&DeadmanSwitch> {
        self.deadman.as_ref()
    }

    /// Parse and handle one line of operator input; blank lines are skipped
    pub async fn handle_line(&self, line: &str) -> Result<(), RacerError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let message = OperatorMessage::parse(line)?;
        self.handle(message).await;
        Ok(())
    }

    pub async fn handle(&self, message: OperatorMessage) {
        if let Some(deadman) = &self.deadman {
            deadman.beat().await;
        }

        match message {
            OperatorMessage::Heartbeat => debug!("Operator heartbeat"),
            OperatorMessage::Car(event) => {
                debug!("Car control event {} {:?}", event.id, event.kind);
                if !self.manual.push(event.command()) {
                    debug!("Car control event {} ignored, manual driver not in control", event.id);
                }
            }
            OperatorMessage::Race(event) => {
                info!("Race control event {} {:?}", event.id, event.kind);
                match event.kind {
                    RaceControlType::Manual => self.race.start_manual_driving().await,
                    RaceControlType::InitRace => self.race.init_race().await,
                    RaceControlType::Race => self.race.start_race().await,
                    RaceControlType::Stop => self.race.stop_race().await,
                    RaceControlType::Pause => self.race.pause_race().await,
                    RaceControlType::Continue => self.race.continue_race().await,
                }
            }
            OperatorMessage::Frame { lines } => self.submit_frame(lines),
        }
    }

    fn submit_frame(&self, lines: Vec<LineSegment>) {
        let Some(vision) = &self.vision else {
            debug!("Frame ignored, vision navigation disabled");
            return;
        };

        let lines = filter_by_slope(&lines, vision.min_slope, vision.max_slope);
        match vision.frames.try_send(lines) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!("Steering busy, dropping frame"),
            Err(TrySendError::Closed(_)) => warn!("Steering stopped, dropping frame"),
        }
    }

    /// Park the car and stop every background task
    pub async fn shutdown(self) {
        info!("Shutting down racer");
        for task in &self.tasks {
            task.abort();
        }
        self.race.start_manual_driving().await;
        self.race.driving().release().await;
    }
}

fn spawn_status_logging(race: &RaceControlService) -> JoinHandle<()> {
    let mut race_status = race.subscribe_status();
    let mut car_status = race.driving().subscribe_status();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                status = race_status.next() => match status {
                    Some(status) => info!("Race status: {}", status),
                    None => break,
                },
                status = car_status.next() => match status {
                    Some(status) => debug!(
                        speed = status.speed.value(),
                        direction = status.direction.degrees(),
                        "Car status"
                    ),
                    None => break,
                },
            }
        }
    })
}
