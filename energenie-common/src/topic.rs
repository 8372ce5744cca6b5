//! Topic namespace for the Energenie bridge.
//!
//! Every topic starts with a separator followed by the root namespace:
//! `/<root>/<device-kind>/...`, so tokenizing yields an empty first segment.

/// Default root namespace segment.
pub const TOPIC_ROOT: &str = "energenie";

/// Device-kind segment for ENER002 OOK sockets.
pub const ENER002: &str = "ENER002";

/// Device-kind segment for eTRV radiator valves.
pub const ETRV: &str = "eTRV";

/// Command namespace segment under a device kind.
pub const COMMAND: &str = "Command";

/// Report namespace segment under a device kind.
pub const REPORT: &str = "Report";

/// Temperature report/command segment.
pub const TEMPERATURE: &str = "Temperature";

/// Identify command segment.
pub const IDENTIFY: &str = "Identify";

/// Builder for topics under a root namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBuilder {
    root: String,
}

impl Default for TopicBuilder {
    fn default() -> Self {
        Self::new(TOPIC_ROOT)
    }
}

impl TopicBuilder {
    /// Create a builder for the given root namespace.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// The root namespace segment.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Topic filter matching every socket command.
    ///
    /// # Example
    /// ```
    /// use energenie_common::topic::TopicBuilder;
    ///
    /// assert_eq!(TopicBuilder::default().socket_filter(), "/energenie/ENER002/#");
    /// ```
    pub fn socket_filter(&self) -> String {
        format!("/{}/{}/#", self.root, ENER002)
    }

    /// Topic filter matching every valve command.
    ///
    /// # Example
    /// ```
    /// use energenie_common::topic::TopicBuilder;
    ///
    /// assert_eq!(
    ///     TopicBuilder::default().valve_command_filter(),
    ///     "/energenie/eTRV/Command/#"
    /// );
    /// ```
    pub fn valve_command_filter(&self) -> String {
        format!("/{}/{}/{}/#", self.root, ETRV, COMMAND)
    }

    /// The filters subscribed to on every successful connect.
    pub fn subscriptions(&self) -> Vec<String> {
        vec![self.socket_filter(), self.valve_command_filter()]
    }

    /// Prefix of the valve temperature report topics.
    pub fn temperature_report_prefix(&self) -> String {
        format!("/{}/{}/{}/{}", self.root, ETRV, REPORT, TEMPERATURE)
    }

    /// Topic on which a valve's temperature is reported.
    ///
    /// # Example
    /// ```
    /// use energenie_common::topic::TopicBuilder;
    ///
    /// assert_eq!(
    ///     TopicBuilder::default().temperature_report(7),
    ///     "/energenie/eTRV/Report/Temperature/7"
    /// );
    /// ```
    pub fn temperature_report(&self, sensor_id: u32) -> String {
        format!("{}/{}", self.temperature_report_prefix(), sensor_id)
    }
}

/// Split a topic into its level segments.
///
/// Empty levels are kept, so a leading separator yields an empty first segment.
pub fn tokenize(topic: &str) -> Vec<&str> {
    topic.split('/').collect()
}
