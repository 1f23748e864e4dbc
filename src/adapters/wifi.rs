//! WiFi station adapter.
//!
//! The speakers are only reachable over WiFi, so boot blocks in
//! [`WifiAdapter::connect_blocking`] until the station has an IP, and the
//! control loop then calls [`ConnectivityPort::poll`] every cycle to notice
//! a lost link and bring it back.
//!
//! Retries are spaced by [`Backoff`]: 2 s, doubling per failure, capped at
//! 60 s, reset once associated.  `poll` never sleeps and never waits on the
//! radio: a due retry only starts association, and later polls check
//! whether the station came back or the attempt ran past
//! [`REJOIN_TIMEOUT_MS`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` from `esp_idf_svc::wifi`.
//! - **all other targets**: a scripted link for host-side tests.

use log::{info, warn};

use crate::config::{KnobConfig, WIFI_PLACEHOLDER};
use crate::error::ConnectivityError;

#[cfg(target_os = "espidf")]
use {
    embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration},
    esp_idf_svc::eventloop::EspSystemEventLoop,
    esp_idf_svc::hal::modem::Modem,
    esp_idf_svc::nvs::EspDefaultNvsPartition,
    esp_idf_svc::sys::EspError,
    esp_idf_svc::wifi::{BlockingWifi, EspWifi},
};

pub trait ConnectivityPort {
    /// One association attempt, waiting for an IP.  Boot only.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Detect link loss and drive a rejoin.  Returns without waiting.
    fn poll(&mut self, now_ms: u32);
}

// ── Credentials ───────────────────────────────────────────────

/// Checked SSID/passphrase pair.  An empty passphrase means an open network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl StationCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        let printable = ssid.bytes().all(|b| (0x20..=0x7E).contains(&b));
        if ssid.is_empty() || !printable {
            return Err(ConnectivityError::InvalidSsid);
        }
        if !password.is_empty() && password.len() < 8 {
            return Err(ConnectivityError::InvalidPassword);
        }

        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(creds)
    }

    /// Credentials baked into the config.  A firmware built without
    /// `VOLKNOB_WIFI_SSID` has nothing to join.
    pub fn from_config(config: &KnobConfig) -> Result<Self, ConnectivityError> {
        if config.wifi_ssid == WIFI_PLACEHOLDER {
            return Err(ConnectivityError::NoCredentials);
        }
        Self::new(&config.wifi_ssid, &config.wifi_password)
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ── Retry spacing ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    secs: u32,
}

impl Backoff {
    pub const FIRST_SECS: u32 = 2;
    pub const CAP_SECS: u32 = 60;

    pub fn new() -> Self {
        Self {
            secs: Self::FIRST_SECS,
        }
    }

    pub fn secs(self) -> u32 {
        self.secs
    }

    /// Whether the current delay has passed since `since_ms`.
    pub fn elapsed(self, since_ms: u32, now_ms: u32) -> bool {
        now_ms.wrapping_sub(since_ms) >= self.secs * 1_000
    }

    pub fn grow(&mut self) {
        self.secs = (self.secs * 2).min(Self::CAP_SECS);
    }

    pub fn reset(&mut self) {
        self.secs = Self::FIRST_SECS;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

// ── Adapter ───────────────────────────────────────────────────

/// How long a started rejoin may take before it counts as failed.
pub const REJOIN_TIMEOUT_MS: u32 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Never associated.
    Down,
    Up,
    /// Was up; `since_ms` is when it dropped or the last retry failed.
    Lost { retries: u32, since_ms: u32 },
    /// Association started at `started_ms`; not up yet.
    Rejoining { retries: u32, started_ms: u32 },
}

pub struct WifiAdapter {
    credentials: StationCredentials,
    link: Link,
    backoff: Backoff,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: upcoming association attempts that fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
    /// Simulation: a rejoin is in flight.
    #[cfg(not(target_os = "espidf"))]
    sim_joining: bool,
    /// Simulation: the access point never answers.
    #[cfg(not(target_os = "espidf"))]
    sim_stalled: bool,
}

impl WifiAdapter {
    /// Create the driver.  The radio stays off until the first connect.
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        credentials: StationCredentials,
    ) -> Result<Self, EspError> {
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sys_loop.clone(), nvs)?, sys_loop)?;
        Ok(Self {
            credentials,
            link: Link::Down,
            backoff: Backoff::new(),
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(credentials: StationCredentials) -> Self {
        Self {
            credentials,
            link: Link::Down,
            backoff: Backoff::new(),
            sim_failures: 0,
            sim_associated: false,
            sim_joining: false,
            sim_stalled: false,
        }
    }

    pub fn link(&self) -> Link {
        self.link
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Retry until associated, sleeping out the backoff between attempts.
    /// Boot only: the watchdog is not armed yet.
    pub fn connect_blocking(&mut self) -> Result<(), ConnectivityError> {
        loop {
            match self.connect() {
                Ok(()) | Err(ConnectivityError::AlreadyConnected) => return Ok(()),
                Err(ConnectivityError::ConnectionFailed) => {
                    warn!("WiFi: retrying in {}s", self.backoff.secs());
                    std::thread::sleep(std::time::Duration::from_secs(u64::from(
                        self.backoff.secs(),
                    )));
                    self.backoff.grow();
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn associate(&mut self) -> Result<(), ConnectivityError> {
        self.platform_associate()?;
        self.link = Link::Up;
        self.backoff.reset();
        Ok(())
    }

    fn retry_later(&mut self, retries: u32, now_ms: u32) {
        self.backoff.grow();
        self.link = Link::Lost {
            retries: retries + 1,
            since_ms: now_ms,
        };
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_associate(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.credentials.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self
                .credentials
                .ssid()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .credentials
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let failed = |stage: &str, e: EspError| {
            warn!("WiFi: {} failed: {}", stage, e);
            ConnectivityError::ConnectionFailed
        };
        self.wifi
            .set_configuration(&conf)
            .map_err(|e| failed("configure", e))?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(|e| failed("start", e))?;
        }
        self.wifi.connect().map_err(|e| failed("associate", e))?;
        self.wifi
            .wait_netif_up()
            .map_err(|e| failed("DHCP", e))?;

        if let Ok(ip) = self.wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: '{}' up, IP {}", self.credentials.ssid(), ip.ip);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_associate(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_associated = true;
        info!("WiFi(sim): '{}' up", self.credentials.ssid());
        Ok(())
    }

    /// Kick off association and return at once.  The configuration set at
    /// boot is still in place.
    #[cfg(target_os = "espidf")]
    fn platform_begin_rejoin(&mut self) -> Result<(), ConnectivityError> {
        self.wifi.wifi_mut().connect().map_err(|e| {
            warn!("WiFi: rejoin failed to start: {}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_rejoin(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_joining = true;
        Ok(())
    }

    /// Associated and holding an IP.  Never blocks.
    #[cfg(target_os = "espidf")]
    fn platform_link_up(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    /// An in-flight rejoin lands on the first check after it started.
    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&mut self) -> bool {
        if self.sim_joining && !self.sim_stalled {
            self.sim_joining = false;
            self.sim_associated = true;
        }
        self.sim_associated
    }

    /// Simulation: fail the next `n` association attempts.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures = n;
    }

    /// Simulation: the access point goes away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_associated = false;
    }

    /// Simulation: started rejoins never complete while set.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_stall(&mut self, stalled: bool) {
        self.sim_stalled = stalled;
    }
}

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.link == Link::Up {
            return Err(ConnectivityError::AlreadyConnected);
        }
        info!("WiFi: joining '{}'", self.credentials.ssid());
        self.associate()
    }

    /// As of the last [`poll`](ConnectivityPort::poll).
    fn is_connected(&self) -> bool {
        self.link == Link::Up
    }

    fn poll(&mut self, now_ms: u32) {
        match self.link {
            Link::Up => {
                if !self.platform_link_up() {
                    warn!("WiFi: link lost");
                    self.link = Link::Lost {
                        retries: 0,
                        since_ms: now_ms,
                    };
                }
            }
            Link::Lost { retries, since_ms } if self.backoff.elapsed(since_ms, now_ms) => {
                info!("WiFi: rejoin #{} after {}s", retries + 1, self.backoff.secs());
                match self.platform_begin_rejoin() {
                    Ok(()) => {
                        self.link = Link::Rejoining {
                            retries,
                            started_ms: now_ms,
                        };
                    }
                    Err(_) => self.retry_later(retries, now_ms),
                }
            }
            Link::Rejoining { retries, started_ms } => {
                if self.platform_link_up() {
                    info!("WiFi: back up after {} ms", now_ms.wrapping_sub(started_ms));
                    self.link = Link::Up;
                    self.backoff.reset();
                } else if now_ms.wrapping_sub(started_ms) >= REJOIN_TIMEOUT_MS {
                    warn!("WiFi: rejoin timed out");
                    self.retry_later(retries, now_ms);
                }
            }
            Link::Down | Link::Lost { .. } => {}
        }
    }
}
