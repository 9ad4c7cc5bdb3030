//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# FengChao client configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# FENGCHAO_KEY, FENGCHAO_SECRET and FENGCHAO_BASE_URL override the [service] values.

[service]
# base_url = "https://fengchao.example.com/api"
# api_key = ""
# secret_key = ""
# request_timeout_secs = 30   # 1-300
# connect_timeout_secs = 10   # 1-60
# token_ttl_secs = 1700       # 60-3600
# models_ttl_secs = 86400

[completion]
# model = "ERNIE-Bot-4"
# max_tokens = 2000           # 1-32768
# timeout_secs = 60           # 1-3600
# is_sensitive = false
# do_sample = false
# temperature = 0.9           # 0.0-2.0
# top_p = 0.8                 # 0.0-1.0
# stop = []
"##
    .to_string()
}
