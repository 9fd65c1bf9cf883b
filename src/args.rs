// Command line parsing for vkms-setup
//
// Every token is validated before anything is provisioned, so a typo in
// the last connector never leaves a half configured device behind.
//
// Austin Shafer - 2025
use utils::{anyhow, bail, Context, Result};
use vkms::{ConnectorSpec, ConnectorType, MonitorName, ParsedType, VkmsError};

pub const USAGE: &str = "\
Usage:
  Simple mode:   vkms-setup <number_of_connectors>
  Advanced mode: vkms-setup --config TYPE,NUMBER_OF_OVERLAY_PLANES[,EDID_NAME] ...
  Cleanup:       vkms-setup --cleanup
Where:
  TYPE = connector type (DP, HDMIA, HDMIB, eDP, DSI, VGA, VIRTUAL, WRITEBACK, DPI, UNKNOWN)
  NUMBER_OF_OVERLAY_PLANES = number of additional overlay planes (integer)
  EDID_NAME = optional EDID profile name (e.g. ACI_9713_ASUS_VE258_DP)
Examples:
  vkms-setup 3
  vkms-setup --config DP,2 HDMIA,1
  vkms-setup --config DP,2,ACI_9713_ASUS_VE258_DP HDMIA,1,ACI_9155_ASUS_VH238_HDMI";

/// What the user asked us to do
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `count` default connectors
    Generic(usize),
    /// One connector per spec
    Config(Vec<ConnectorSpec>),
    /// Remove a topology left behind by an earlier run
    Cleanup,
}

/// Parse the arguments following the program name
pub fn parse_args(args: &[String]) -> Result<Command> {
    let first = match args.first() {
        Some(first) => first.as_str(),
        None => bail!("No arguments provided"),
    };

    match first {
        "--cleanup" => {
            if args.len() > 1 {
                bail!("--cleanup takes no arguments");
            }
            Ok(Command::Cleanup)
        }
        "--config" => {
            if args.len() < 2 {
                bail!("No configuration parameters provided after --config");
            }

            let specs = args[1..]
                .iter()
                .enumerate()
                .map(|(i, token)| parse_connector(i, token))
                .collect::<Result<Vec<_>>>()
                .context("Failed to parse connector configurations")?;
            Ok(Command::Config(specs))
        }
        count => match count.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Command::Generic(n)),
            _ => Err(anyhow!(
                "Invalid number of connectors: {}. Must be a positive integer.",
                count
            )),
        },
    }
}

/// Parse one `TYPE[,PLANES[,EDID_NAME]]` token describing connector `index`
///
/// An empty plane count means no overlays.
pub fn parse_connector(index: usize, token: &str) -> Result<ConnectorSpec> {
    let fields: Vec<&str> = token.split(',').collect();
    if fields.len() > 3 {
        bail!("Too many fields in connector configuration {:?}", token);
    }

    let ty = match ConnectorType::parse(fields[0]) {
        ParsedType::Known(ty) => ty,
        ParsedType::Unrecognized(name) => return Err(VkmsError::UnknownConnectorType(name).into()),
    };
    let mut spec = ConnectorSpec::create().with_type(ty);

    if let Some(planes) = fields.get(1).filter(|p| !p.is_empty()) {
        let planes = planes
            .parse::<usize>()
            .map_err(|_| anyhow!("Invalid number of planes: {}", planes))?;
        spec = spec.with_additional_overlay_planes(planes);
    }

    if let Some(edid_name) = fields.get(2) {
        let monitor = MonitorName::from_name(edid_name)
            .ok_or_else(|| VkmsError::UnknownMonitor(edid_name.to_string()))?;
        spec = spec.with_monitor(monitor);
    }

    spec.validate(index)?;
    Ok(spec)
}
