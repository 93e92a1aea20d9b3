mod helpers;
mod mesh;
mod ping;
mod routing;
mod shutdown;
mod variables;
