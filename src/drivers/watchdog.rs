//! Task Watchdog Timer (TWDT) driver.
//!
//! The control loop never blocks for more than the idle delay, so a
//! stall longer than the configured timeout means the firmware is wedged
//! and the TWDT resets the device.  `feed()` is called once per loop
//! iteration.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset, ESP_OK,
};

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    ///
    /// Subscription failure is logged and tolerated: the controller is
    /// better off running unsupervised than not running.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: one-shot configuration from the main task before the
        // control loop starts.
        let subscribed = unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!("TWDT reconfigure returned {ret} (may already be configured)");
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
        };

        if subscribed {
            log::info!("Watchdog: subscribed ({timeout_ms} ms timeout)");
        } else {
            log::warn!("Watchdog: subscription failed, running unsupervised");
        }
        Self { subscribed }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        log::info!("Watchdog(sim): no-op ({timeout_ms} ms timeout)");
        Self {}
    }

    /// Feed the watchdog.  Must be called at least once per timeout window.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: reset only touches the calling task's TWDT entry.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
