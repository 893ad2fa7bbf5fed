use std::collections::HashMap;

pub struct I18n {
    translations: HashMap<String, HashMap<String, String>>,
    current_lang: String,
}

impl I18n {
    pub fn new(lang: &str) -> Self {
        let mut translations = HashMap::new();

        // English
        let mut en = HashMap::new();
        // Catalog views
        en.insert("no_commands_match".to_string(), "No commands match the filter".to_string());
        en.insert("commands_total".to_string(), "{0} commands".to_string());
        en.insert("label_category".to_string(), "Category:".to_string());
        en.insert("label_command".to_string(), "Command:".to_string());
        en.insert("label_usage".to_string(), "Usage:".to_string());
        en.insert("label_examples".to_string(), "Examples:".to_string());
        en.insert("label_parameters".to_string(), "Parameters:".to_string());
        en.insert("label_sample_output".to_string(), "Sample output:".to_string());
        en.insert("label_risks".to_string(), "Risks:".to_string());
        en.insert("label_tips".to_string(), "Tips:".to_string());
        en.insert("required".to_string(), "required".to_string());
        en.insert("default".to_string(), "default".to_string());
        en.insert("requires_confirmation".to_string(), "Requires confirmation before it runs".to_string());
        en.insert("did_you_mean".to_string(), "Did you mean:".to_string());
        en.insert("unknown_command".to_string(), "Unknown command id: {0}".to_string());
        en.insert("unknown_command_suggest".to_string(), "Unknown command id: {0} (did you mean {1}?)".to_string());

        // Records
        en.insert("status_running".to_string(), "running".to_string());
        en.insert("status_success".to_string(), "success".to_string());
        en.insert("status_error".to_string(), "error".to_string());
        en.insert("execution_time".to_string(), "{0}ms".to_string());

        // Metrics
        en.insert("fleet_title".to_string(), "Fleet overview".to_string());
        en.insert("fleet_nodes".to_string(), "Active nodes".to_string());
        en.insert("fleet_stake".to_string(), "Total stake".to_string());
        en.insert("fleet_rewards".to_string(), "Total rewards".to_string());
        en.insert("fleet_apy".to_string(), "Average APY".to_string());
        en.insert("fleet_uptime".to_string(), "Uptime".to_string());
        en.insert("fleet_participation".to_string(), "Participation".to_string());
        en.insert("fleet_blocks".to_string(), "Blocks proposed / missed".to_string());
        en.insert("fleet_success".to_string(), "Success rate".to_string());
        en.insert("live_title".to_string(), "Live node metrics".to_string());
        en.insert("live_network".to_string(), "net in {0} KB/s  out {1} KB/s  peers {2}  uptime {3}".to_string());
        en.insert("sync_synced".to_string(), "synced".to_string());
        en.insert("sync_syncing".to_string(), "syncing".to_string());

        // Connection
        en.insert("connecting".to_string(), "Connecting to {0} at {1} over {2}...".to_string());
        en.insert("connection_ok".to_string(), "Connection established".to_string());
        en.insert("connection_test_ok".to_string(), "Connection test succeeded".to_string());
        en.insert("connection_failed".to_string(), "Connection failed: the node did not respond".to_string());
        en.insert("node_not_active".to_string(), "Connection failed: node is {0}, not active".to_string());
        en.insert("state_disconnected".to_string(), "Disconnected".to_string());
        en.insert("state_connecting".to_string(), "Connecting...".to_string());
        en.insert("state_connected".to_string(), "Connected to {0} ({1}, {2})".to_string());

        // Console
        en.insert("console_title".to_string(), "vdash".to_string());
        en.insert("console_gauges".to_string(), "cpu {0}%  mem {1}%  disk {2}%  peers {3}  up {4}".to_string());
        en.insert("console_hint".to_string(), "Enter=run  ↑/↓=history  Tab=complete  Ctrl-L=clear  Esc=quit  :help=console commands".to_string());
        en.insert("console_meta_help".to_string(), ":run ID  :confirm  :results  :terminal  :metrics  :history  :copy [N]  :export FILE  :clear  :disconnect  :quit".to_string());
        en.insert("terminal_empty".to_string(), "Type a command, e.g. ls, df -h or validator-cli status".to_string());
        en.insert("results_empty".to_string(), "No panel results yet. Try :run system-status".to_string());
        en.insert("history_empty".to_string(), "No commands typed yet".to_string());
        en.insert("history_recall".to_string(), "(history)".to_string());
        en.insert("panel_started".to_string(), "Running: {0}".to_string());
        en.insert("panel_running".to_string(), "{0} is running...".to_string());
        en.insert("panel_finished".to_string(), "Finished: {0} ({1})".to_string());
        en.insert("confirm_prompt".to_string(), "{0} can disrupt the node. Type :confirm to run it".to_string());
        en.insert("nothing_to_confirm".to_string(), "Nothing is waiting for confirmation".to_string());
        en.insert("usage_run".to_string(), "Usage: :run <command id>".to_string());
        en.insert("usage_export".to_string(), "Usage: :export <file>".to_string());
        en.insert("unknown_meta".to_string(), "Unknown console command: :{0}".to_string());
        en.insert("copied".to_string(), "Output copied to clipboard".to_string());
        en.insert("nothing_to_copy".to_string(), "No output to copy".to_string());
        en.insert("exported".to_string(), "Exported {0} record(s) to {1}".to_string());
        en.insert("session_closed".to_string(), "Session closed".to_string());
        en.insert("confirm_run_prompt".to_string(), "{0} can disrupt the node. Type 'yes' to run it: ".to_string());
        en.insert("run_aborted".to_string(), "Aborted".to_string());

        // Errors
        en.insert("error_export".to_string(), "Failed to export session".to_string());
        en.insert("error_raw_mode".to_string(), "Failed to switch the terminal to raw mode".to_string());

        // 中文
        let mut zh = HashMap::new();
        zh.insert("no_commands_match".to_string(), "没有匹配的命令".to_string());
        zh.insert("commands_total".to_string(), "共 {0} 条命令".to_string());
        zh.insert("label_category".to_string(), "分类:".to_string());
        zh.insert("label_command".to_string(), "命令:".to_string());
        zh.insert("label_usage".to_string(), "用法:".to_string());
        zh.insert("label_examples".to_string(), "示例:".to_string());
        zh.insert("label_parameters".to_string(), "参数:".to_string());
        zh.insert("label_sample_output".to_string(), "示例输出:".to_string());
        zh.insert("label_risks".to_string(), "风险:".to_string());
        zh.insert("label_tips".to_string(), "提示:".to_string());
        zh.insert("required".to_string(), "必填".to_string());
        zh.insert("default".to_string(), "默认".to_string());
        zh.insert("requires_confirmation".to_string(), "执行前需要确认".to_string());
        zh.insert("did_you_mean".to_string(), "你是否想要:".to_string());
        zh.insert("unknown_command".to_string(), "未知命令 ID: {0}".to_string());
        zh.insert("unknown_command_suggest".to_string(), "未知命令 ID: {0}（是否想要 {1}?）".to_string());

        zh.insert("status_running".to_string(), "执行中".to_string());
        zh.insert("status_success".to_string(), "成功".to_string());
        zh.insert("status_error".to_string(), "失败".to_string());
        zh.insert("execution_time".to_string(), "{0}毫秒".to_string());

        zh.insert("fleet_title".to_string(), "节点总览".to_string());
        zh.insert("fleet_nodes".to_string(), "活跃节点".to_string());
        zh.insert("fleet_stake".to_string(), "总质押".to_string());
        zh.insert("fleet_rewards".to_string(), "总收益".to_string());
        zh.insert("fleet_apy".to_string(), "平均年化".to_string());
        zh.insert("fleet_uptime".to_string(), "在线率".to_string());
        zh.insert("fleet_participation".to_string(), "网络参与度".to_string());
        zh.insert("fleet_blocks".to_string(), "出块 / 漏块".to_string());
        zh.insert("fleet_success".to_string(), "成功率".to_string());
        zh.insert("live_title".to_string(), "节点实时指标".to_string());
        zh.insert("live_network".to_string(), "入站 {0} KB/s  出站 {1} KB/s  对等节点 {2}  运行 {3}".to_string());
        zh.insert("sync_synced".to_string(), "已同步".to_string());
        zh.insert("sync_syncing".to_string(), "同步中".to_string());

        zh.insert("connecting".to_string(), "正在通过 {2} 连接 {0} ({1})...".to_string());
        zh.insert("connection_ok".to_string(), "连接成功".to_string());
        zh.insert("connection_test_ok".to_string(), "连接测试成功".to_string());
        zh.insert("connection_failed".to_string(), "连接失败：节点无响应".to_string());
        zh.insert("node_not_active".to_string(), "连接失败：节点状态为 {0}，未处于活跃状态".to_string());
        zh.insert("state_disconnected".to_string(), "未连接".to_string());
        zh.insert("state_connecting".to_string(), "连接中...".to_string());
        zh.insert("state_connected".to_string(), "已连接 {0} ({1}, {2})".to_string());

        zh.insert("console_title".to_string(), "vdash".to_string());
        zh.insert("console_gauges".to_string(), "CPU {0}%  内存 {1}%  磁盘 {2}%  对等节点 {3}  运行 {4}".to_string());
        zh.insert("console_hint".to_string(), "回车=执行  ↑/↓=历史  Tab=补全  Ctrl-L=清屏  Esc=退出  :help=控制台命令".to_string());
        zh.insert("console_meta_help".to_string(), ":run ID  :confirm  :results  :terminal  :metrics  :history  :copy [N]  :export 文件  :clear  :disconnect  :quit".to_string());
        zh.insert("terminal_empty".to_string(), "输入命令，例如 ls、df -h 或 validator-cli status".to_string());
        zh.insert("results_empty".to_string(), "暂无面板结果，试试 :run system-status".to_string());
        zh.insert("history_empty".to_string(), "还没有输入过命令".to_string());
        zh.insert("history_recall".to_string(), "(历史)".to_string());
        zh.insert("panel_started".to_string(), "执行中: {0}".to_string());
        zh.insert("panel_running".to_string(), "{0} 正在执行...".to_string());
        zh.insert("panel_finished".to_string(), "已完成: {0} ({1})".to_string());
        zh.insert("confirm_prompt".to_string(), "{0} 可能影响节点运行，输入 :confirm 确认执行".to_string());
        zh.insert("nothing_to_confirm".to_string(), "没有等待确认的命令".to_string());
        zh.insert("usage_run".to_string(), "用法: :run <命令 ID>".to_string());
        zh.insert("usage_export".to_string(), "用法: :export <文件>".to_string());
        zh.insert("unknown_meta".to_string(), "未知控制台命令: :{0}".to_string());
        zh.insert("copied".to_string(), "输出已复制到剪贴板".to_string());
        zh.insert("nothing_to_copy".to_string(), "没有可复制的输出".to_string());
        zh.insert("exported".to_string(), "已导出 {0} 条记录到 {1}".to_string());
        zh.insert("session_closed".to_string(), "会话已结束".to_string());
        zh.insert("confirm_run_prompt".to_string(), "{0} 可能影响节点运行，输入 'yes' 确认执行: ".to_string());
        zh.insert("run_aborted".to_string(), "已取消".to_string());

        zh.insert("error_export".to_string(), "导出会话失败".to_string());
        zh.insert("error_raw_mode".to_string(), "无法将终端切换到原始模式".to_string());

        translations.insert("en".to_string(), en);
        translations.insert("zh".to_string(), zh);

        let effective_lang = if lang.starts_with("zh") || lang == "cn" || lang == "chinese" {
            "zh"
        } else {
            "en"
        };

        Self {
            translations,
            current_lang: effective_lang.to_string(),
        }
    }

    /// Missing keys fall back to English, then to the key itself.
    pub fn t(&self, key: &str) -> String {
        [self.current_lang.as_str(), "en"]
            .iter()
            .filter_map(|lang| self.translations.get(*lang))
            .find_map(|map| map.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn t_format(&self, key: &str, args: &[&str]) -> String {
        let mut result = self.t(key);
        for (i, arg) in args.iter().enumerate() {
            result = result.replace(&format!("{{{}}}", i), arg);
        }
        result
    }
}
