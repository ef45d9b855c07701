pub mod types {
    pub mod dsi;
    pub mod mode;
    pub mod reboot;
}

pub mod sysfs {
    pub mod attribute;
}

pub mod drivers {
    pub mod dsi {
        pub mod chardev;
        pub mod trace;
    }

    pub mod devmem;
    pub mod gpio;
    pub mod regulator;
}

pub mod backlight;
pub mod board;
pub mod config;
pub mod dsi;
pub mod hw;
pub mod of;
pub mod panel;
pub mod reboot;

#[cfg(test)]
mod testing;
