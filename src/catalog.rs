use crate::fuzzy_matcher::FzfMatcher;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    System,
    Validator,
    Monitoring,
    Security,
    Maintenance,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::System,
        Category::Validator,
        Category::Monitoring,
        Category::Security,
        Category::Maintenance,
        Category::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::System => "system",
            Category::Validator => "validator",
            Category::Monitoring => "monitoring",
            Category::Security => "security",
            Category::Maintenance => "maintenance",
            Category::Advanced => "advanced",
        }
    }

    /// Parse a category filter. `Ok(None)` means "all".
    pub fn parse(name: &str) -> Result<Option<Category>, String> {
        let name = name.trim().to_lowercase();
        if name.is_empty() || name == "all" {
            return Ok(None);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .map(Some)
            .ok_or_else(|| format!("unknown category '{name}'"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub kind: ParamType,
    pub default: Option<&'static str>,
}

/// Documentation entry for one operational command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCommand {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub command: &'static str,
    pub category: Category,
    pub requires_confirmation: bool,
    pub usage: &'static str,
    pub examples: &'static [&'static str],
    pub parameters: &'static [Parameter],
    pub output: Option<&'static str>,
    pub risks: &'static [&'static str],
    pub tips: &'static [&'static str],
}

pub(crate) const SYSTEMCTL_STATUS: &str = "● validator.service - Validator Node Service
   Loaded: loaded (/etc/systemd/system/validator.service; enabled)
   Active: active (running) since Mon 2024-01-15 10:30:15 UTC
   Main PID: 1234 (validator)
   Tasks: 15 (limit: 4915)
   Memory: 256.0M
   CGroup: /system.slice/validator.service
           └─1234 /usr/bin/validator --config=/etc/validator/config.yaml";

pub(crate) const VALIDATOR_STATUS: &str = "Validator Node Status
====================
Status: Active
Sync Status: Synced
Block Height: 1,234,567
Latest Block: 0x1234...abcd
Peers Connected: 25
Uptime: 15d 7h 32m
Stake Amount: 32 ETH
Rewards Earned: 0.045 ETH
APY: 5.2%";

static COMMANDS: &[CatalogCommand] = &[
    // system
    CatalogCommand {
        id: "system-status",
        name: "System Status",
        description: "Check overall system health and status",
        command: "systemctl status",
        category: Category::System,
        requires_confirmation: false,
        usage: "systemctl status [service_name]",
        examples: &[
            "systemctl status validator",
            "systemctl status --no-pager",
            "systemctl status -l",
        ],
        parameters: &[],
        output: Some(SYSTEMCTL_STATUS),
        risks: &[],
        tips: &[
            "Use --no-pager for non-interactive output",
            "Add -l flag for full log lines",
            "Check specific services by adding service name",
        ],
    },
    CatalogCommand {
        id: "restart-validator",
        name: "Restart Validator",
        description: "Restart the validator service",
        command: "sudo systemctl restart validator",
        category: Category::System,
        requires_confirmation: true,
        usage: "sudo systemctl restart [service_name]",
        examples: &[
            "sudo systemctl restart validator",
            "sudo systemctl restart validator && systemctl status validator",
        ],
        parameters: &[],
        output: None,
        risks: &[
            "Will temporarily stop validator operations",
            "May cause missed block proposals",
            "Ensure you have proper monitoring in place",
        ],
        tips: &[
            "Check service status after restart",
            "Monitor logs for any errors",
            "Consider restarting during low-activity periods",
        ],
    },
    CatalogCommand {
        id: "update-system",
        name: "Update System",
        description: "Update system packages and security patches",
        command: "sudo apt update && sudo apt upgrade -y",
        category: Category::System,
        requires_confirmation: true,
        usage: "sudo apt update && sudo apt upgrade [-y]",
        examples: &[
            "sudo apt update && sudo apt upgrade -y",
            "sudo apt update && sudo apt upgrade --dry-run",
            "sudo apt list --upgradable",
        ],
        parameters: &[],
        output: None,
        risks: &[
            "May require system restart",
            "Could break existing services",
            "Always backup before major updates",
        ],
        tips: &[
            "Use --dry-run to preview changes",
            "Update during maintenance windows",
            "Test updates in staging environment first",
        ],
    },
    CatalogCommand {
        id: "check-disk",
        name: "Check Disk Usage",
        description: "Check disk space and usage",
        command: "df -h",
        category: Category::System,
        requires_confirmation: false,
        usage: "df [options] [mount_point]",
        examples: &["df -h", "df -h /var/lib/validator", "du -sh /var/lib/validator/*"],
        parameters: &[Parameter {
            name: "-h",
            description: "Human-readable sizes",
            required: false,
            kind: ParamType::Boolean,
            default: None,
        }],
        output: None,
        risks: &[],
        tips: &[
            "Keep at least 20% free on the data volume",
            "Use du to find large directories",
        ],
    },
    // validator
    CatalogCommand {
        id: "validator-status",
        name: "Validator Status",
        description: "Check validator node status and sync",
        command: "validator-cli status",
        category: Category::Validator,
        requires_confirmation: false,
        usage: "validator-cli status [options]",
        examples: &[
            "validator-cli status",
            "validator-cli status --json",
            "validator-cli status --verbose",
        ],
        parameters: &[
            Parameter {
                name: "--json",
                description: "Output in JSON format",
                required: false,
                kind: ParamType::Boolean,
                default: None,
            },
            Parameter {
                name: "--verbose",
                description: "Show detailed information",
                required: false,
                kind: ParamType::Boolean,
                default: None,
            },
        ],
        output: Some(VALIDATOR_STATUS),
        risks: &[],
        tips: &[
            "Check sync status regularly",
            "Monitor peer count for network health",
            "Track rewards and APY performance",
        ],
    },
    CatalogCommand {
        id: "validator-logs",
        name: "View Logs",
        description: "View recent validator logs",
        command: "tail -n 100 /var/log/validator.log",
        category: Category::Validator,
        requires_confirmation: false,
        usage: "tail -n [lines] [log_file]",
        examples: &[
            "tail -n 100 /var/log/validator.log",
            "tail -f /var/log/validator.log",
            "grep ERROR /var/log/validator.log",
        ],
        parameters: &[
            Parameter {
                name: "-n",
                description: "Number of lines to show",
                required: false,
                kind: ParamType::Number,
                default: Some("100"),
            },
            Parameter {
                name: "-f",
                description: "Follow log file in real-time",
                required: false,
                kind: ParamType::Boolean,
                default: None,
            },
        ],
        output: None,
        risks: &[],
        tips: &[
            "Use -f flag for real-time monitoring",
            "Combine with grep for filtering",
            "Check for ERROR and WARN messages",
        ],
    },
    CatalogCommand {
        id: "validator-config",
        name: "Show Config",
        description: "Display current validator configuration",
        command: "cat /etc/validator/config.yaml",
        category: Category::Validator,
        requires_confirmation: false,
        usage: "cat [config_file]",
        examples: &[
            "cat /etc/validator/config.yaml",
            "grep -n \"port\" /etc/validator/config.yaml",
            "diff config.yaml config.yaml.backup",
        ],
        parameters: &[],
        output: None,
        risks: &[],
        tips: &[
            "Always backup config before changes",
            "Validate YAML syntax before applying",
            "Use diff to compare configurations",
        ],
    },
    CatalogCommand {
        id: "validator-keys",
        name: "List Keys",
        description: "List validator keys and addresses",
        command: "validator-cli keys list",
        category: Category::Validator,
        requires_confirmation: false,
        usage: "validator-cli keys list [options]",
        examples: &["validator-cli keys list", "validator-cli keys list --json"],
        parameters: &[Parameter {
            name: "--json",
            description: "Output in JSON format",
            required: false,
            kind: ParamType::Boolean,
            default: None,
        }],
        output: None,
        risks: &[],
        tips: &[
            "Never paste private keys into shared terminals",
            "Verify addresses against your deposit records",
        ],
    },
    // monitoring
    CatalogCommand {
        id: "monitor-resources",
        name: "Resource Monitor",
        description: "Real-time resource usage monitoring",
        command: "htop",
        category: Category::Monitoring,
        requires_confirmation: false,
        usage: "htop [options]",
        examples: &["htop", "htop -d 2", "htop -u validator"],
        parameters: &[
            Parameter {
                name: "-d",
                description: "Update delay in seconds",
                required: false,
                kind: ParamType::Number,
                default: Some("1"),
            },
            Parameter {
                name: "-u",
                description: "Show only processes for user",
                required: false,
                kind: ParamType::String,
                default: None,
            },
        ],
        output: None,
        risks: &[],
        tips: &["Press F1 for help in htop", "Use F5 for tree view", "Press q to quit"],
    },
    CatalogCommand {
        id: "network-status",
        name: "Network Status",
        description: "Check network connectivity and peers",
        command: "netstat -tulpn",
        category: Category::Monitoring,
        requires_confirmation: false,
        usage: "netstat [options]",
        examples: &["netstat -tulpn", "netstat -i", "ss -tulpn"],
        parameters: &[],
        output: Some(
            "Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name
tcp        0      0 0.0.0.0:22              0.0.0.0:*               LISTEN      1234/sshd
tcp        0      0 0.0.0.0:30303           0.0.0.0:*               LISTEN      1234/validator
tcp        0      0 0.0.0.0:8545            0.0.0.0:*               LISTEN      1234/validator",
        ),
        risks: &[],
        tips: &[
            "Use ss command for modern systems",
            "Check for open ports and services",
            "Monitor established connections",
        ],
    },
    // security
    CatalogCommand {
        id: "security-audit",
        name: "Security Audit",
        description: "Run security audit and vulnerability scan",
        command: "sudo lynis audit system",
        category: Category::Security,
        requires_confirmation: true,
        usage: "sudo lynis audit [target]",
        examples: &[
            "sudo lynis audit system",
            "sudo lynis audit system --quick",
            "sudo lynis audit system --report-file audit.log",
        ],
        parameters: &[
            Parameter {
                name: "--quick",
                description: "Quick audit mode",
                required: false,
                kind: ParamType::Boolean,
                default: None,
            },
            Parameter {
                name: "--report-file",
                description: "Save report to file",
                required: false,
                kind: ParamType::String,
                default: None,
            },
        ],
        output: None,
        risks: &[
            "May take significant time to complete",
            "Could generate false positives",
            "Review findings carefully before acting",
        ],
        tips: &[
            "Run during low-activity periods",
            "Review and address high-priority findings",
            "Keep audit reports for compliance",
        ],
    },
    CatalogCommand {
        id: "firewall-status",
        name: "Firewall Status",
        description: "Check firewall rules and status",
        command: "sudo ufw status verbose",
        category: Category::Security,
        requires_confirmation: false,
        usage: "sudo ufw status [options]",
        examples: &[
            "sudo ufw status verbose",
            "sudo ufw status numbered",
            "sudo iptables -L",
        ],
        parameters: &[],
        output: Some(
            "Status: active

To                         Action      From
--                         ------      ----
22/tcp                     ALLOW IN    Anywhere
30303/tcp                  ALLOW IN    Anywhere
8545/tcp                   ALLOW IN    Anywhere
22/tcp (v6)                ALLOW IN    Anywhere (v6)
30303/tcp (v6)             ALLOW IN    Anywhere (v6)
8545/tcp (v6)              ALLOW IN    Anywhere (v6)",
        ),
        risks: &[],
        tips: &[
            "Regularly review firewall rules",
            "Only allow necessary ports",
            "Monitor for unauthorized access attempts",
        ],
    },
    CatalogCommand {
        id: "ssl-cert-check",
        name: "SSL Certificate Check",
        description: "Check SSL certificate validity",
        command: "openssl x509 -in /etc/ssl/certs/validator.crt -text -noout",
        category: Category::Security,
        requires_confirmation: false,
        usage: "openssl x509 -in [certificate] [options]",
        examples: &[
            "openssl x509 -in /etc/ssl/certs/validator.crt -text -noout",
            "openssl x509 -in /etc/ssl/certs/validator.crt -noout -enddate",
        ],
        parameters: &[Parameter {
            name: "-in",
            description: "Certificate file to inspect",
            required: true,
            kind: ParamType::String,
            default: None,
        }],
        output: None,
        risks: &[],
        tips: &[
            "Renew certificates well before expiry",
            "Check -enddate from a cron job",
        ],
    },
    // advanced
    CatalogCommand {
        id: "validator-metrics",
        name: "Validator Metrics",
        description: "Get detailed validator performance metrics",
        command: "validator-cli metrics",
        category: Category::Advanced,
        requires_confirmation: false,
        usage: "validator-cli metrics [options]",
        examples: &[
            "validator-cli metrics",
            "validator-cli metrics --format=json",
            "validator-cli metrics --period=24h",
        ],
        parameters: &[
            Parameter {
                name: "--format",
                description: "Output format (text, json, prometheus)",
                required: false,
                kind: ParamType::String,
                default: Some("text"),
            },
            Parameter {
                name: "--period",
                description: "Time period for metrics",
                required: false,
                kind: ParamType::String,
                default: Some("1h"),
            },
        ],
        output: Some(
            "Validator Metrics (Last 24h)
===============================
Blocks Proposed: 720
Blocks Missed: 2
Success Rate: 99.72%
Average Block Time: 12.1s
Network Participation: 100%
Rewards Earned: 0.045 ETH
Gas Used: 15,234,567
Peers Connected: 25 (avg)",
        ),
        risks: &[],
        tips: &[
            "Monitor success rate closely",
            "Track missed blocks and reasons",
            "Use metrics for performance optimization",
        ],
    },
    // maintenance
    CatalogCommand {
        id: "backup-validator",
        name: "Backup Validator",
        description: "Create backup of validator data",
        command: "tar -czf /backup/validator-$(date +%Y%m%d).tar.gz /var/lib/validator",
        category: Category::Maintenance,
        requires_confirmation: true,
        usage: "tar -czf [backup_file] [source_directory]",
        examples: &[
            "tar -czf /backup/validator-$(date +%Y%m%d).tar.gz /var/lib/validator",
            "rsync -av /var/lib/validator/ /backup/validator/",
            "tar -czf backup.tar.gz --exclude=*.log /var/lib/validator",
        ],
        parameters: &[],
        output: None,
        risks: &[
            "May impact validator performance during backup",
            "Ensure sufficient disk space",
            "Verify backup integrity after creation",
        ],
        tips: &[
            "Schedule backups during low-activity periods",
            "Test backup restoration procedures",
            "Store backups in multiple locations",
        ],
    },
    CatalogCommand {
        id: "clean-logs",
        name: "Clean Logs",
        description: "Clean old log files to free space",
        command: "sudo journalctl --vacuum-time=7d",
        category: Category::Maintenance,
        requires_confirmation: true,
        usage: "sudo journalctl --vacuum-time=[period]",
        examples: &[
            "sudo journalctl --vacuum-time=7d",
            "sudo journalctl --vacuum-size=500M",
        ],
        parameters: &[Parameter {
            name: "--vacuum-time",
            description: "Remove journal entries older than this",
            required: false,
            kind: ParamType::String,
            default: Some("7d"),
        }],
        output: None,
        risks: &["Old logs are gone for good", "Incident investigations may need them"],
        tips: &["Archive logs you may need before vacuuming"],
    },
    CatalogCommand {
        id: "optimize-database",
        name: "Optimize Database",
        description: "Optimize validator database performance",
        command: "validator-cli db optimize",
        category: Category::Maintenance,
        requires_confirmation: true,
        usage: "validator-cli db optimize [options]",
        examples: &["validator-cli db optimize", "validator-cli db optimize --dry-run"],
        parameters: &[Parameter {
            name: "--dry-run",
            description: "Report what would be compacted",
            required: false,
            kind: ParamType::Boolean,
            default: None,
        }],
        output: None,
        risks: &[
            "Database is locked while compacting",
            "Validator may miss duties during the run",
        ],
        tips: &["Back up the data directory first", "Run with --dry-run to size the job"],
    },
];

/// Every catalog entry, in catalog order.
pub fn all() -> &'static [CatalogCommand] {
    COMMANDS
}

pub fn lookup(id: &str) -> Option<&'static CatalogCommand> {
    all().iter().find(|c| c.id == id)
}

/// Filter by category and by a case-insensitive substring over name,
/// description and command text. Catalog order is preserved.
pub fn list(category: Option<Category>, search: &str) -> Vec<&'static CatalogCommand> {
    let needle = search.to_lowercase();
    all()
        .iter()
        .filter(|c| category.map_or(true, |k| c.category == k))
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
                || c.command.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Closest catalog ids for a mistyped lookup, best first.
pub fn suggest(query: &str, limit: usize) -> Vec<&'static str> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let matcher = FzfMatcher::new();
    let items: Vec<(&'static str, String)> = all()
        .iter()
        .map(|c| (c.id, format!("{} {}", c.id, c.name.to_lowercase())))
        .collect();
    matcher
        .match_and_sort(&query, items)
        .into_iter()
        .map(|(id, _, _)| id)
        .take(limit)
        .collect()
}
