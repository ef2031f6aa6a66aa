mod disputes;
mod helpers;
mod mocks;
mod rooms;
