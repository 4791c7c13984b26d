
/// Prefixes every message with the name of the module that
/// emitted it and hands it to the `log` facade. What ends up
/// where is up to the logger the target installs.
#[derive(Clone)]
pub struct TraceHelper
{
    source_mod: String
}

impl TraceHelper
{
    pub fn new(module_name: String) -> Self
    {
        TraceHelper
        {
            source_mod: module_name
        }
    }

    pub fn trace(&self, message: String)
    {
        log::info!("{}: {}", self.source_mod, message);
    }

    pub fn trace_str(&self, message: &str)
    {
        self.trace(message.to_string());
    }

    pub fn warn(&self, message: String)
    {
        log::warn!("{}: {}", self.source_mod, message);
    }

    pub fn debug(&self, message: String)
    {
        log::debug!("{}: {}", self.source_mod, message);
    }
}
