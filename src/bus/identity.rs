/// Where a service object can be reached on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub bus_name: &'static str,
    pub object_path: &'static str,
    pub interface_name: &'static str,
}

pub const DATE_TIME_IDENTITY: ServiceIdentity = ServiceIdentity {
    bus_name: "com.deepin.daemon.DateAndTime",
    object_path: "/com/deepin/daemon/DateAndTime",
    interface_name: "com.deepin.daemon.DateAndTime",
};

/// Settings namespace holding the date/time preferences.
pub const DATE_TIME_SCHEMA: &str = "com.deepin.dde.datetime";

pub const AUTO_SET_TIME_KEY: &str = "is-auto-set";
pub const TIME_SHOW_FORMAT_KEY: &str = "is-24hour";
