//! Fixed chat copy: command help, panel guide, console command guide

pub const COMMANDS_HELP: &str = "🛠 *Commands:*\n\
`/add <name>` - Add player\n\
`/remove <name>` - Remove player\n\
`/kick <name>` - Kick player\n\
`/top` - Playtime ranks\n\
`/cmd <command>` - Run RCON (Owner) 💻";

pub const GUIDE_TEXT: &str = "📜 *Common Commands Guide (Commander):*\n\
Type `/cmd` followed by the command:\n\n\
⏰ *Time & Weather:*\n\
`time set day` (Day)\n\
`weather clear` (Clear)\n\n\
👤 *Player Management:*\n\
`gamemode creative <name>`\n\
`gamemode survival <name>`\n\
`tp <player> <target>` (Teleport)\n\
`give <name> diamond 64`\n\n\
🔨 *Admin:*\n\
`op <name>` (Give OP)\n\
`deop <name>` (Remove OP)\n\
`kick <name>`\n\
`ban <name>`\n\
`say <message>` (Broadcast)";

pub const HELP_TEXT: &str = "ℹ️ *Control Panel Guide:*\n\n\
⚡ *Start/Stop/Restart:* Power controls.\n\
------------------\n\
⚙️ *Settings:* Time ☀️, Weather 🌧️, Difficulty 💀.\n\
 *Properties:* Edit PvP, Flight, Max Players (Req. Restart).\n\
------------------\n\
 *Players:* Click 'Online' to Manage Players:\n\
   • 🎮 Gamemode (Survival/Creative/Spectator)\n\
   • 🔨 Ban / Unban\n\
   • ⚡ OP / De-OP (Owner Only 🔒)\n\
   • 🥾 Kick\n\
------------------\n\
🔒 *Lock:* Whitelist ON (Only trusted).\n\
📜 *Whitelist:* Show allowed players.\n\
------------------\n\
📦 *Backup:* Send world copy to Telegram.\n\
📢 *Broadcast:* Send big title message.\n\
💻 */cmd:* Run console commands (Owner).\n\
🏆 *Playtime:* /top for ranks.";
