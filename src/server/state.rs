use std::sync::Arc;

use crate::composer::FlyerComposer;
use crate::enhance::Enhancer;
use crate::providers::ProviderImpl;
use crate::render::ImageSource;
use crate::settings::Settings;

#[derive(Clone)]
pub struct ServerState {
    pub(crate) composer: FlyerComposer,
    pub(crate) enhancer: Enhancer<ProviderImpl>,
    pub(crate) images: Arc<dyn ImageSource>,
    pub(crate) settings: Settings,
}

impl ServerState {
    pub fn new(
        composer: FlyerComposer,
        enhancer: Enhancer<ProviderImpl>,
        images: Arc<dyn ImageSource>,
        settings: Settings,
    ) -> Self {
        Self {
            composer,
            enhancer,
            images,
            settings,
        }
    }
}
